//! In-memory revocation storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::entities::revocation::{RevocationEntry, RevocationScope, RevocationStats};
use crate::errors::{DomainError, PersistenceError};

use super::r#trait::RevocationRepository;

/// Map of revocation entries keyed by scope key.
///
/// This is the process-local tier of the revocation store. It never fails.
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, RevocationEntry>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a token entry. Returns false when an active entry already exists.
    pub async fn insert_token(&self, entry: RevocationEntry, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        let key = entry.key();
        if entries.get(&key).is_some_and(|existing| existing.is_active_at(now)) {
            return false;
        }
        entries.insert(key, entry);
        true
    }

    /// Record or extend an identity entry
    pub async fn upsert_identity(&self, entry: RevocationEntry, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        let key = entry.key();
        if let Some(existing) = entries.get_mut(&key) {
            if existing.is_active_at(now) {
                existing.merge(&entry);
                return;
            }
        }
        entries.insert(key, entry);
    }

    pub async fn is_token_revoked(&self, jti: &str, now: DateTime<Utc>) -> bool {
        let key = RevocationScope::Token {
            jti: jti.to_string(),
        }
        .key();
        self.active(&key, now).await.is_some()
    }

    pub async fn identity_revoked_at(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let key = RevocationScope::Identity {
            subject_id: subject_id.to_string(),
        }
        .key();
        self.active(&key, now).await.map(|entry| entry.revoked_at)
    }

    /// Look up an active entry, dropping it if it has already expired
    async fn active(&self, key: &str, now: DateTime<Utc>) -> Option<RevocationEntry> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_active_at(now) => return Some(entry.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_active_at(now)) {
            entries.remove(key);
        }
        None
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_active_at(now));
        before - entries.len()
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> RevocationStats {
        let entries = self.entries.read().await;
        let mut stats = RevocationStats::default();
        for entry in entries.values().filter(|e| e.is_active_at(now)) {
            stats.total += 1;
            if entry.scope.is_identity() {
                stats.identity_revocations += 1;
            } else {
                stats.token_revocations += 1;
            }
        }
        stats
    }

    /// Number of stored entries, expired ones included
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Revocation repository held entirely in process memory.
///
/// Selected with `REVOCATION_BACKEND=memory` for single-instance
/// deployments, and used in tests where the fault switches simulate an
/// unreachable or slow durable tier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationRepository {
    tier: Arc<MemoryTier>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl InMemoryRevocationRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with `Unavailable`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with `Unavailable`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every call by `delay`
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    pub async fn entry_count(&self) -> usize {
        self.tier.entry_count().await
    }

    async fn before_read(&self) -> Result<(), DomainError> {
        self.pause().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn before_write(&self) -> Result<(), DomainError> {
        self.pause().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn pause(&self) {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn unavailable() -> DomainError {
    PersistenceError::Unavailable {
        message: "in-memory repository fault injected".to_string(),
    }
    .into()
}

#[async_trait]
impl RevocationRepository for InMemoryRevocationRepository {
    async fn insert_token_entry(&self, entry: &RevocationEntry) -> Result<bool, DomainError> {
        self.before_write().await?;
        Ok(self.tier.insert_token(entry.clone(), Utc::now()).await)
    }

    async fn upsert_identity_entry(&self, entry: &RevocationEntry) -> Result<(), DomainError> {
        self.before_write().await?;
        self.tier.upsert_identity(entry.clone(), Utc::now()).await;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        self.before_read().await?;
        Ok(self.tier.is_token_revoked(jti, now).await)
    }

    async fn identity_revoked_at(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.before_read().await?;
        Ok(self.tier.identity_revoked_at(subject_id, now).await)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.before_write().await?;
        Ok(self.tier.purge_expired(now).await)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<RevocationStats, DomainError> {
        self.before_read().await?;
        Ok(self.tier.stats(now).await)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.before_read().await
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
