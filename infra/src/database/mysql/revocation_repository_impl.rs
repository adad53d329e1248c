//! MySQL implementation of the RevocationRepository trait.
//!
//! Expected table:
//!
//! ```sql
//! CREATE TABLE token_revocations (
//!     scope_key   VARCHAR(320) NOT NULL PRIMARY KEY,
//!     subject_id  VARCHAR(255) NULL,
//!     reason      VARCHAR(255) NOT NULL,
//!     revoked_at  DATETIME(6)  NOT NULL,
//!     expires_at  DATETIME(6)  NOT NULL,
//!     INDEX idx_token_revocations_expires_at (expires_at),
//!     INDEX idx_token_revocations_subject_id (subject_id)
//! );
//! ```
//!
//! `scope_key` is `jti:<id>` for single credentials and `sub:<id>` for
//! identity-wide entries. `subject_id` is only set on identity entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use wd_core::domain::entities::revocation::{RevocationEntry, RevocationScope, RevocationStats};
use wd_core::errors::DomainError;
use wd_core::repositories::RevocationRepository;

use super::unavailable;

/// MySQL implementation of RevocationRepository
pub struct MySqlRevocationRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRevocationRepository {
    /// Create a new MySQL revocation repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn token_key(jti: &str) -> String {
        RevocationScope::Token {
            jti: jti.to_string(),
        }
        .key()
    }

    fn identity_key(subject_id: &str) -> String {
        RevocationScope::Identity {
            subject_id: subject_id.to_string(),
        }
        .key()
    }
}

#[async_trait]
impl RevocationRepository for MySqlRevocationRepository {
    async fn insert_token_entry(&self, entry: &RevocationEntry) -> Result<bool, DomainError> {
        let query = r#"
            INSERT IGNORE INTO token_revocations (
                scope_key, subject_id, reason, revoked_at, expires_at
            ) VALUES (?, NULL, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(entry.key())
            .bind(&entry.reason)
            .bind(entry.revoked_at)
            .bind(entry.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("insert token revocation", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_identity_entry(&self, entry: &RevocationEntry) -> Result<(), DomainError> {
        // reason is assigned before revoked_at so it compares against the old cut-off
        let query = r#"
            INSERT INTO token_revocations (
                scope_key, subject_id, reason, revoked_at, expires_at
            ) VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                reason = IF(VALUES(revoked_at) >= revoked_at, VALUES(reason), reason),
                revoked_at = GREATEST(revoked_at, VALUES(revoked_at)),
                expires_at = GREATEST(expires_at, VALUES(expires_at))
        "#;

        sqlx::query(query)
            .bind(entry.key())
            .bind(entry.scope.subject_id())
            .bind(&entry.reason)
            .bind(entry.revoked_at)
            .bind(entry.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("upsert identity revocation", e))?;

        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            SELECT 1 FROM token_revocations
            WHERE scope_key = ? AND expires_at > ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(Self::token_key(jti))
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("check token revocation", e))?;

        Ok(row.is_some())
    }

    async fn identity_revoked_at(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let query = r#"
            SELECT revoked_at FROM token_revocations
            WHERE scope_key = ? AND expires_at > ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(Self::identity_key(subject_id))
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("check identity revocation", e))?;

        match row {
            Some(row) => {
                let revoked_at: DateTime<Utc> = row.try_get("revoked_at").map_err(|e| DomainError::Internal {
                    message: format!("Failed to get revoked_at: {}", e),
                })?;
                Ok(Some(revoked_at))
            }
            None => Ok(None),
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM token_revocations WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("delete expired revocations", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<RevocationStats, DomainError> {
        let query = r#"
            SELECT
                COUNT(*) AS total,
                CAST(COALESCE(SUM(CASE WHEN subject_id IS NULL THEN 0 ELSE 1 END), 0) AS SIGNED) AS identity_count
            FROM token_revocations
            WHERE expires_at > ?
        "#;

        let row = sqlx::query(query)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unavailable("count revocations", e))?;

        let total: i64 = row.try_get("total").map_err(|e| DomainError::Internal {
            message: format!("Failed to get total: {}", e),
        })?;
        let identity: i64 = row.try_get("identity_count").map_err(|e| DomainError::Internal {
            message: format!("Failed to get identity_count: {}", e),
        })?;

        Ok(RevocationStats {
            total: total as usize,
            identity_revocations: identity as usize,
            token_revocations: (total - identity) as usize,
        })
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("health check", e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}
