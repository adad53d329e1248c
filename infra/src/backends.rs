//! Wiring of the durable revocation tier and the identity directory

use std::sync::Arc;
use tracing::info;
use wd_core::repositories::{IdentityRepository, InMemoryRevocationRepository, RevocationRepository};
use wd_shared::config::{AppConfig, RevocationBackend};

use crate::cache::{RedisClient, RedisRevocationRepository};
use crate::database::{DatabasePool, MySqlIdentityRepository, MySqlRevocationRepository};
use crate::InfrastructureError;

/// Connected storage handed to the credential authority
pub struct Infrastructure {
    pub pool: DatabasePool,
    pub revocations: Arc<dyn RevocationRepository>,
    pub identities: Arc<dyn IdentityRepository>,
}

impl Infrastructure {
    /// Connect to MySQL and to the configured revocation backend
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let pool = DatabasePool::new(&config.database).await?;
        let revocations = revocation_repository(config, &pool).await?;
        let identities: Arc<dyn IdentityRepository> =
            Arc::new(MySqlIdentityRepository::new(pool.pool().clone()));

        Ok(Self {
            pool,
            revocations,
            identities,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Build the durable revocation tier selected by `REVOCATION_BACKEND`
///
/// `memory` keeps revocations in this process only and is meant for
/// single-instance development setups.
pub async fn revocation_repository(
    config: &AppConfig,
    pool: &DatabasePool,
) -> Result<Arc<dyn RevocationRepository>, InfrastructureError> {
    let repository: Arc<dyn RevocationRepository> = match config.revocation.backend {
        RevocationBackend::MySql => Arc::new(MySqlRevocationRepository::new(pool.pool().clone())),
        RevocationBackend::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            Arc::new(RedisRevocationRepository::new(client))
        }
        RevocationBackend::Memory => {
            if config.environment.is_strict() {
                tracing::warn!(
                    "In-memory revocation backend selected in {}; revocations will not be shared",
                    config.environment
                );
            }
            Arc::new(InMemoryRevocationRepository::new())
        }
    };

    info!(backend = repository.backend_name(), "Revocation backend ready");
    Ok(repository)
}
