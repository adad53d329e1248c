use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wd_shared::config::{FailurePolicy, RevocationConfig};

use crate::domain::entities::revocation::{RevocationEntry, RevocationStats};
use crate::errors::{DomainError, PersistenceError};
use crate::repositories::{MemoryTier, RevocationRepository};
use crate::services::sweeper::Sweepable;

/// Result of a revocation write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Recorded in both tiers
    Durable,
    /// The durable write failed. Effective on this instance only until the
    /// entry expires or the process restarts.
    MemoryOnly,
}

impl WriteOutcome {
    pub fn is_durable(&self) -> bool {
        matches!(self, WriteOutcome::Durable)
    }
}

/// Configuration for the revocation store
#[derive(Debug, Clone)]
pub struct RevocationStoreConfig {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub failure_policy: FailurePolicy,
    /// Consecutive failed durable writes before the alarm is raised. Zero is
    /// treated as one.
    pub write_alarm_threshold: u32,
}

impl Default for RevocationStoreConfig {
    fn default() -> Self {
        Self::from(&RevocationConfig::default())
    }
}

impl From<&RevocationConfig> for RevocationStoreConfig {
    fn from(config: &RevocationConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            failure_policy: config.failure_policy,
            write_alarm_threshold: config.write_alarm_threshold,
        }
    }
}

/// Health snapshot for the `/health` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RevocationHealth {
    pub backend: &'static str,
    pub durable_reachable: bool,
    pub failure_policy: String,
    pub consecutive_write_failures: u32,
    pub write_alarm: bool,
    pub memory_entries: usize,
}

/// Two-tier denylist of credentials and identities.
///
/// Never returns an error to callers. Unavailable durable reads resolve to
/// the configured [`FailurePolicy`] and failed durable writes surface as
/// [`WriteOutcome::MemoryOnly`].
pub struct RevocationStore {
    memory: MemoryTier,
    durable: Arc<dyn RevocationRepository>,
    config: RevocationStoreConfig,
    write_failures: AtomicU32,
}

impl RevocationStore {
    pub fn new(durable: Arc<dyn RevocationRepository>, config: RevocationStoreConfig) -> Self {
        Self {
            memory: MemoryTier::new(),
            durable,
            config,
            write_failures: AtomicU32::new(0),
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    /// Denylist one credential until `expires_at`
    pub async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>, reason: &str) -> WriteOutcome {
        let entry = RevocationEntry::token(jti, expires_at, reason);
        self.memory.insert_token(entry.clone(), Utc::now()).await;

        let durable = self.durable.clone();
        let result = self
            .with_timeout("insert_token_entry", self.config.write_timeout, async move {
                durable.insert_token_entry(&entry).await
            })
            .await;

        match result {
            Ok(inserted) => {
                debug!(jti, inserted, "Recorded token revocation");
                self.record_write_success();
                WriteOutcome::Durable
            }
            Err(e) => {
                self.record_write_failure("insert_token_entry", &e);
                WriteOutcome::MemoryOnly
            }
        }
    }

    /// Revoke every credential of `subject_id` issued up to now
    pub async fn revoke_all_for_identity(
        &self,
        subject_id: &str,
        expires_at: DateTime<Utc>,
        reason: &str,
    ) -> WriteOutcome {
        let entry = RevocationEntry::identity(subject_id, expires_at, reason);
        self.memory.upsert_identity(entry.clone(), Utc::now()).await;

        let durable = self.durable.clone();
        let result = self
            .with_timeout("upsert_identity_entry", self.config.write_timeout, async move {
                durable.upsert_identity_entry(&entry).await
            })
            .await;

        match result {
            Ok(()) => {
                info!(subject_id, reason, "Revoked all credentials for identity");
                self.record_write_success();
                WriteOutcome::Durable
            }
            Err(e) => {
                self.record_write_failure("upsert_identity_entry", &e);
                WriteOutcome::MemoryOnly
            }
        }
    }

    /// Check whether a credential id is denylisted
    pub async fn is_revoked(&self, jti: &str) -> bool {
        let now = Utc::now();
        if self.memory.is_token_revoked(jti, now).await {
            return true;
        }

        let durable = self.durable.clone();
        let jti_owned = jti.to_string();
        let result = self
            .with_timeout("is_token_revoked", self.config.read_timeout, async move {
                durable.is_token_revoked(&jti_owned, now).await
            })
            .await;

        match result {
            Ok(revoked) => revoked,
            Err(e) => self.unavailable_verdict("is_token_revoked", &e),
        }
    }

    /// Cut-off of an active identity-wide revocation
    ///
    /// Under fail-closed an unreachable durable tier yields `Some(now)`, which
    /// rejects everything already issued.
    pub async fn identity_revoked_at(&self, subject_id: &str) -> Option<DateTime<Utc>> {
        let now = Utc::now();
        if let Some(revoked_at) = self.memory.identity_revoked_at(subject_id, now).await {
            return Some(revoked_at);
        }

        let durable = self.durable.clone();
        let subject = subject_id.to_string();
        let result = self
            .with_timeout("identity_revoked_at", self.config.read_timeout, async move {
                durable.identity_revoked_at(&subject, now).await
            })
            .await;

        match result {
            Ok(revoked_at) => revoked_at,
            Err(e) => self
                .unavailable_verdict("identity_revoked_at", &e)
                .then_some(now),
        }
    }

    pub async fn is_identity_revoked(&self, subject_id: &str) -> bool {
        self.identity_revoked_at(subject_id).await.is_some()
    }

    /// Delete expired entries from both tiers
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let from_memory = self.memory.purge_expired(now).await;

        let durable = self.durable.clone();
        let from_durable = match self
            .with_timeout("delete_expired", self.config.write_timeout, async move {
                durable.delete_expired(now).await
            })
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!("Durable revocation sweep failed: {}", e);
                0
            }
        };

        if from_memory + from_durable > 0 {
            info!(
                memory = from_memory,
                durable = from_durable,
                "Swept expired revocation entries"
            );
        }
        from_memory + from_durable
    }

    /// Active entry counts from the durable tier
    pub async fn stats(&self) -> Result<RevocationStats, DomainError> {
        let durable = self.durable.clone();
        let now = Utc::now();
        self.with_timeout("stats", self.config.read_timeout, async move {
            durable.stats(now).await
        })
        .await
    }

    pub async fn health(&self) -> RevocationHealth {
        let durable = self.durable.clone();
        let reachable = self
            .with_timeout("health_check", self.config.read_timeout, async move {
                durable.health_check().await
            })
            .await
            .is_ok();
        let failures = self.consecutive_write_failures();

        RevocationHealth {
            backend: self.durable.backend_name(),
            durable_reachable: reachable,
            failure_policy: self.config.failure_policy.to_string(),
            consecutive_write_failures: failures,
            write_alarm: self.write_alarm_raised(),
            memory_entries: self.memory.entry_count().await,
        }
    }

    pub fn consecutive_write_failures(&self) -> u32 {
        self.write_failures.load(Ordering::SeqCst)
    }

    pub fn write_alarm_raised(&self) -> bool {
        self.consecutive_write_failures() >= self.alarm_threshold()
    }

    fn alarm_threshold(&self) -> u32 {
        self.config.write_alarm_threshold.max(1)
    }

    /// Run a durable call with a deadline. The future is spawned so that a
    /// timed-out call is detached rather than cancelled midway.
    async fn with_timeout<T, F>(
        &self,
        operation: &'static str,
        limit: Duration,
        call: F,
    ) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, DomainError>> + Send + 'static,
    {
        let handle = tokio::spawn(call);
        match tokio::time::timeout(limit, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(DomainError::Internal {
                message: format!("durable {} task failed: {}", operation, join_error),
            }),
            Err(_) => Err(PersistenceError::Timeout {
                operation,
                millis: limit.as_millis() as u64,
            }
            .into()),
        }
    }

    fn unavailable_verdict(&self, operation: &'static str, err: &DomainError) -> bool {
        let verdict = self.config.failure_policy.unavailable_verdict();
        error!(
            operation,
            policy = %self.config.failure_policy,
            revoked = verdict,
            "Durable revocation tier unavailable: {}",
            err
        );
        verdict
    }

    fn record_write_success(&self) {
        let previous = self.write_failures.swap(0, Ordering::SeqCst);
        if previous >= self.alarm_threshold() {
            info!(
                after_failures = previous,
                "Durable revocation writes recovered"
            );
        }
    }

    fn record_write_failure(&self, operation: &'static str, err: &DomainError) {
        let failures = self.write_failures.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(
            operation,
            consecutive_failures = failures,
            "Revocation recorded in memory only: {}",
            err
        );
        if failures == self.alarm_threshold() {
            error!(
                alarm = "revocation_write_path",
                consecutive_failures = failures,
                "Durable revocation tier keeps rejecting writes; revocations are not shared across instances"
            );
        }
    }
}

#[async_trait]
impl Sweepable for RevocationStore {
    fn name(&self) -> &'static str {
        "revocation"
    }

    async fn sweep(&self) -> usize {
        self.sweep_expired().await
    }
}
