//! Durable revocation tier interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::revocation::{RevocationEntry, RevocationStats};
use crate::errors::DomainError;

/// Storage for revocation entries that must survive restarts and be shared
/// across instances.
///
/// Every read takes `now` so that entries whose `expires_at <= now` are
/// treated as absent even before a sweep removes them.
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Insert a token entry
    ///
    /// Inserting a `jti` that is already present is a no-op.
    ///
    /// # Returns
    /// * `Ok(true)` - A new entry was written
    /// * `Ok(false)` - The key already existed
    async fn insert_token_entry(&self, entry: &RevocationEntry) -> Result<bool, DomainError>;

    /// Insert or extend an identity entry
    ///
    /// When the subject already has an entry the later `revoked_at` and
    /// `expires_at` win.
    async fn upsert_identity_entry(&self, entry: &RevocationEntry) -> Result<(), DomainError>;

    /// Check for an active token entry
    async fn is_token_revoked(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Cut-off of the active identity entry, if any
    async fn identity_revoked_at(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError>;

    /// Remove entries whose `expires_at <= now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count active entries
    async fn stats(&self, now: DateTime<Utc>) -> Result<RevocationStats, DomainError>;

    /// Probe connectivity
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }

    /// Short backend label for logs and health output
    fn backend_name(&self) -> &'static str;
}
