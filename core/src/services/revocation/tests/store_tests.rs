//! Unit tests for the two-tier revocation store

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use wd_shared::config::FailurePolicy;

use crate::repositories::{InMemoryRevocationRepository, RevocationRepository};
use crate::services::revocation::{RevocationStore, RevocationStoreConfig, WriteOutcome};

fn config(policy: FailurePolicy) -> RevocationStoreConfig {
    RevocationStoreConfig {
        read_timeout: Duration::from_millis(50),
        write_timeout: Duration::from_millis(50),
        failure_policy: policy,
        write_alarm_threshold: 3,
    }
}

fn store_with(policy: FailurePolicy) -> (RevocationStore, InMemoryRevocationRepository) {
    let durable = InMemoryRevocationRepository::new();
    let store = RevocationStore::new(Arc::new(durable.clone()), config(policy));
    (store, durable)
}

fn in_one_hour() -> chrono::DateTime<Utc> {
    Utc::now() + ChronoDuration::hours(1)
}

#[tokio::test]
async fn test_revoke_token_writes_both_tiers() {
    let (store, durable) = store_with(FailurePolicy::FailOpen);

    let outcome = store.revoke_token("jti-1", in_one_hour(), "signout").await;

    assert_eq!(outcome, WriteOutcome::Durable);
    assert!(store.is_revoked("jti-1").await);
    assert!(durable.is_token_revoked("jti-1", Utc::now()).await.unwrap());
    assert!(!store.is_revoked("jti-2").await);
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let (store, durable) = store_with(FailurePolicy::FailOpen);

    store.revoke_token("jti-1", in_one_hour(), "a").await;
    store.revoke_token("jti-1", in_one_hour(), "b").await;

    assert_eq!(durable.entry_count().await, 1);
    assert!(store.is_revoked("jti-1").await);
}

#[tokio::test]
async fn test_durable_entry_visible_to_second_instance() {
    let durable = InMemoryRevocationRepository::new();
    let first = RevocationStore::new(Arc::new(durable.clone()), config(FailurePolicy::FailOpen));
    let second = RevocationStore::new(Arc::new(durable.clone()), config(FailurePolicy::FailOpen));

    first.revoke_token("jti-1", in_one_hour(), "signout").await;

    assert!(second.is_revoked("jti-1").await);
}

#[tokio::test]
async fn test_memory_hit_skips_unreachable_durable_tier() {
    let (store, durable) = store_with(FailurePolicy::FailOpen);
    store.revoke_token("jti-1", in_one_hour(), "signout").await;

    durable.set_fail_reads(true);

    assert!(store.is_revoked("jti-1").await);
}

#[tokio::test]
async fn test_unreachable_reads_follow_policy() {
    let (open, open_durable) = store_with(FailurePolicy::FailOpen);
    open_durable.set_fail_reads(true);
    assert!(!open.is_revoked("unknown").await);
    assert!(!open.is_identity_revoked("u-1").await);

    let (closed, closed_durable) = store_with(FailurePolicy::FailClosed);
    closed_durable.set_fail_reads(true);
    assert!(closed.is_revoked("unknown").await);
    assert!(closed.is_identity_revoked("u-1").await);
}

#[tokio::test(start_paused = true)]
async fn test_slow_durable_read_times_out() {
    let (store, durable) = store_with(FailurePolicy::FailClosed);
    durable.set_delay(Some(Duration::from_secs(5))).await;

    let started = tokio::time::Instant::now();
    assert!(store.is_revoked("unknown").await);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_failed_write_is_memory_only() {
    let (store, durable) = store_with(FailurePolicy::FailOpen);
    durable.set_fail_writes(true);

    let outcome = store.revoke_token("jti-1", in_one_hour(), "signout").await;

    assert_eq!(outcome, WriteOutcome::MemoryOnly);
    assert!(!outcome.is_durable());
    // still effective on this instance
    assert!(store.is_revoked("jti-1").await);
    assert_eq!(durable.entry_count().await, 0);
}

#[tokio::test]
async fn test_write_alarm_raised_and_cleared() {
    let (store, durable) = store_with(FailurePolicy::FailOpen);
    durable.set_fail_writes(true);

    for i in 0..3 {
        store.revoke_token(&format!("jti-{}", i), in_one_hour(), "x").await;
    }
    assert_eq!(store.consecutive_write_failures(), 3);
    assert!(store.write_alarm_raised());
    assert!(store.health().await.write_alarm);

    durable.set_fail_writes(false);
    assert_eq!(store.revoke_token("jti-ok", in_one_hour(), "x").await, WriteOutcome::Durable);
    assert_eq!(store.consecutive_write_failures(), 0);
    assert!(!store.write_alarm_raised());
}

#[tokio::test]
async fn test_zero_alarm_threshold_behaves_as_one() {
    let durable = InMemoryRevocationRepository::new();
    let store = RevocationStore::new(
        Arc::new(durable.clone()),
        RevocationStoreConfig {
            write_alarm_threshold: 0,
            ..config(FailurePolicy::FailOpen)
        },
    );
    assert!(!store.write_alarm_raised());
    assert!(!store.health().await.write_alarm);

    durable.set_fail_writes(true);
    store.revoke_token("jti-1", in_one_hour(), "x").await;
    assert!(store.write_alarm_raised());
}

#[tokio::test]
async fn test_expired_entries_are_inert_and_swept() {
    let (store, durable) = store_with(FailurePolicy::FailOpen);
    let past = Utc::now() - ChronoDuration::seconds(1);

    store.revoke_token("old", past, "signout").await;
    store.revoke_token("live", in_one_hour(), "signout").await;

    assert_eq!(store.sweep_expired().await, 2);
    assert_eq!(durable.entry_count().await, 1);
    assert!(!store.is_revoked("old").await);
    assert!(store.is_revoked("live").await);
}

#[tokio::test]
async fn test_identity_revocation_cutoff() {
    let (store, _durable) = store_with(FailurePolicy::FailOpen);
    let before = Utc::now();

    store
        .revoke_all_for_identity("u-1", Utc::now() + ChronoDuration::days(7), "compromise")
        .await;

    let revoked_at = store.identity_revoked_at("u-1").await.unwrap();
    assert!(revoked_at >= before);
    assert!(store.identity_revoked_at("u-2").await.is_none());
}

#[tokio::test]
async fn test_stats_and_health() {
    let (store, durable) = store_with(FailurePolicy::FailClosed);
    store.revoke_token("jti-1", in_one_hour(), "a").await;
    store
        .revoke_all_for_identity("u-1", Utc::now() + ChronoDuration::days(7), "b")
        .await;

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.identity_revocations, 1);
    assert_eq!(stats.token_revocations, 1);

    let health = store.health().await;
    assert_eq!(health.backend, "memory");
    assert!(health.durable_reachable);
    assert_eq!(health.failure_policy, FailurePolicy::FailClosed.to_string());

    durable.set_fail_reads(true);
    assert!(!store.health().await.durable_reachable);
    assert!(store.stats().await.is_err());
}
