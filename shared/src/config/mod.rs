//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Signing secrets and credential lifetimes
//! - `cache` - Redis connection settings
//! - `database` - Database connection and pool configuration
//! - `environment` - Runtime mode detection and logging configuration
//! - `error` - Fatal configuration errors
//! - `revocation` - Revocation store and role cache policy
//! - `server` - HTTP server binding
//!
//! Every `from_env` constructor has a `from_lookup` twin that reads values
//! through a closure, so configuration parsing can be tested without
//! touching the process environment. A variable that is set but cannot be
//! parsed is a [`ConfigError::Invalid`], never a silent default.

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod error;
pub mod revocation;
pub mod server;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use error::ConfigError;
pub use revocation::{FailurePolicy, RevocationBackend, RevocationConfig, RoleCacheConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Runtime mode
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Signing secrets and credential lifetimes
    pub jwt: JwtConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// Revocation store policy
    pub revocation: RevocationConfig,

    /// Role cache policy
    #[serde(default)]
    pub role_cache: RoleCacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = Environment::from_lookup(lookup)?;
        Ok(Self {
            environment,
            server: ServerConfig::from_lookup(lookup)?,
            jwt: JwtConfig::from_lookup(lookup)?,
            database: DatabaseConfig::from_lookup(lookup)?,
            cache: CacheConfig::from_lookup(lookup)?,
            revocation: RevocationConfig::from_lookup(lookup)?,
            role_cache: RoleCacheConfig::from_lookup(lookup)?,
            logging: LoggingConfig::from_lookup(environment, lookup)?,
        })
    }
}

/// Value of `key` with surrounding whitespace removed. Blank counts as unset.
pub(crate) fn read_var(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse `key` through `lookup`, using `default` only when it is unset
pub(crate) fn parse_var<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match read_var(lookup, key) {
        Some(value) => value
            .parse()
            .map_err(|err| ConfigError::invalid(key, &value, err)),
        None => Ok(default),
    }
}

/// Like [`parse_var`], but zero is rejected
pub(crate) fn parse_nonzero<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = parse_var(lookup, key, default)?;
    if value == T::default() {
        return Err(ConfigError::invalid(key, &value.to_string(), "must be greater than zero"));
    }
    Ok(value)
}
