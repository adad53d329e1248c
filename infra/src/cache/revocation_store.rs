//! Redis implementation of the RevocationRepository trait.
//!
//! Keys:
//! - `revocation:jti:<jti>` holds the reason, written with `SET NX EX`
//! - `revocation:sub:<subject>` holds the cut-off in epoch milliseconds
//!
//! Redis expires keys itself, so `delete_expired` has nothing to do.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::Script;

use wd_core::domain::entities::revocation::{RevocationEntry, RevocationScope, RevocationStats};
use wd_core::errors::{DomainError, PersistenceError};
use wd_core::repositories::RevocationRepository;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

const KEY_NAMESPACE: &str = "revocation";

// Keeps the larger cut-off and the longer remaining lifetime.
const UPSERT_IDENTITY_SCRIPT: &str = r#"
local revoked_at = tonumber(ARGV[1])
local ttl_ms = tonumber(ARGV[2])
local current = redis.call('GET', KEYS[1])
if current and tonumber(current) > revoked_at then
    revoked_at = tonumber(current)
end
local remaining = redis.call('PTTL', KEYS[1])
if remaining > ttl_ms then
    ttl_ms = remaining
end
redis.call('SET', KEYS[1], revoked_at, 'PX', ttl_ms)
return 1
"#;

pub struct RedisRevocationRepository {
    client: RedisClient,
    upsert_identity: Script,
}

impl RedisRevocationRepository {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            upsert_identity: Script::new(UPSERT_IDENTITY_SCRIPT),
        }
    }

    pub(crate) fn key_for(scope: &RevocationScope) -> String {
        format!("{}:{}", KEY_NAMESPACE, scope.key())
    }

    fn token_key(&self, jti: &str) -> String {
        self.client.make_key(&Self::key_for(&RevocationScope::Token {
            jti: jti.to_string(),
        }))
    }

    fn identity_key(&self, subject_id: &str) -> String {
        self.client.make_key(&Self::key_for(&RevocationScope::Identity {
            subject_id: subject_id.to_string(),
        }))
    }
}

/// Remaining lifetime in whole seconds, rounded up. `None` once expired.
pub(crate) fn remaining_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    let millis = (expires_at - now).num_milliseconds();
    if millis <= 0 {
        return None;
    }
    Some(((millis + 999) / 1000) as u64)
}

fn unavailable(error: InfrastructureError) -> DomainError {
    PersistenceError::Unavailable {
        message: error.to_string(),
    }
    .into()
}

#[async_trait]
impl RevocationRepository for RedisRevocationRepository {
    async fn insert_token_entry(&self, entry: &RevocationEntry) -> Result<bool, DomainError> {
        let Some(ttl) = remaining_seconds(entry.expires_at, Utc::now()) else {
            return Ok(false);
        };
        let key = self.client.make_key(&Self::key_for(&entry.scope));

        self.client
            .set_nx_with_expiry(&key, &entry.reason, ttl)
            .await
            .map_err(unavailable)
    }

    async fn upsert_identity_entry(&self, entry: &RevocationEntry) -> Result<(), DomainError> {
        let Some(ttl) = remaining_seconds(entry.expires_at, Utc::now()) else {
            return Ok(());
        };
        let key = self.client.make_key(&Self::key_for(&entry.scope));
        let args = [
            entry.revoked_at.timestamp_millis().to_string(),
            (ttl * 1000).to_string(),
        ];

        self.client
            .run_script(&self.upsert_identity, &key, &args)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str, _now: DateTime<Utc>) -> Result<bool, DomainError> {
        self.client
            .exists(&self.token_key(jti))
            .await
            .map_err(unavailable)
    }

    async fn identity_revoked_at(
        &self,
        subject_id: &str,
        _now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let value = self
            .client
            .get(&self.identity_key(subject_id))
            .await
            .map_err(unavailable)?;

        match value {
            Some(raw) => {
                let millis: i64 = raw.parse().map_err(|_| DomainError::Internal {
                    message: format!("Invalid identity cut-off value: {}", raw),
                })?;
                Ok(Utc.timestamp_millis_opt(millis).single())
            }
            None => Ok(None),
        }
    }

    async fn delete_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        Ok(0)
    }

    async fn stats(&self, _now: DateTime<Utc>) -> Result<RevocationStats, DomainError> {
        let pattern = |kind: &str| self.client.make_key(&format!("{}:{}:*", KEY_NAMESPACE, kind));

        let token_revocations = self
            .client
            .count_matching(&pattern("jti"))
            .await
            .map_err(unavailable)?;
        let identity_revocations = self
            .client
            .count_matching(&pattern("sub"))
            .await
            .map_err(unavailable)?;

        Ok(RevocationStats {
            total: token_revocations + identity_revocations,
            identity_revocations,
            token_revocations,
        })
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        match self.client.health_check().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(PersistenceError::Unavailable {
                message: "unexpected PING reply".to_string(),
            }
            .into()),
            Err(e) => Err(unavailable(e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
