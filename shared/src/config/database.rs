//! Database configuration module

use serde::{Deserialize, Serialize};

use super::{parse_nonzero, read_var, ConfigError};

/// Database configuration for MySQL connections
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Maximum lifetime of a connection in seconds
    pub max_lifetime: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("mysql://localhost:3306/warden"),
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 1800,
        }
    }
}

impl DatabaseConfig {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: read_var(lookup, "DATABASE_URL").unwrap_or_else(|| defaults.url.clone()),
            max_connections: parse_nonzero(
                lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,
            connect_timeout: parse_nonzero(
                lookup,
                "DATABASE_CONNECT_TIMEOUT",
                defaults.connect_timeout,
            )?,
            ..defaults
        })
    }

    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup_from;

    #[test]
    fn test_database_config_builder() {
        let config = DatabaseConfig::new("mysql://db:3306/auth").with_max_connections(50);
        assert_eq!(config.url, "mysql://db:3306/auth");
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.connect_timeout, 30);
    }

    #[test]
    fn test_database_config_rejects_empty_pool() {
        let lookup = lookup_from(&[("DATABASE_MAX_CONNECTIONS", "0")]);
        assert!(DatabaseConfig::from_lookup(&lookup).is_err());

        let lookup = lookup_from(&[("DATABASE_URL", "mysql://db:3306/auth")]);
        let config = DatabaseConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.url, "mysql://db:3306/auth");
        assert_eq!(config.max_connections, 10);
    }
}
