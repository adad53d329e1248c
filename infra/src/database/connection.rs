//! MySQL connection pool shared by the revocation tier and the identity
//! directory

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::log::LevelFilter;
use tracing::{error, info};
use wd_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Statements slower than this are logged at warn
const SLOW_STATEMENT: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Open the pool. Fails if the URL is malformed or no connection can be
    /// made within `connect_timeout`.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, InfrastructureError> {
        let connect_options = Self::connect_options(&config.url)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!(error = %e, "Could not open the MySQL pool");
                InfrastructureError::Database(e)
            })?;

        info!(max_connections = config.max_connections, "MySQL pool ready");
        Ok(Self { pool })
    }

    pub(crate) fn connect_options(url: &str) -> Result<MySqlConnectOptions, InfrastructureError> {
        let options = MySqlConnectOptions::from_str(url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?;

        Ok(options
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, SLOW_STATEMENT))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Waits for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
        info!("MySQL pool closed");
    }
}
