//! Revocation store and role cache policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_nonzero, parse_var, ConfigError};

/// Which durable tier backs the revocation store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackend {
    /// `token_revocations` table in MySQL
    MySql,
    /// Keys with native TTL in Redis
    Redis,
    /// Process-local; not shared across instances
    Memory,
}

impl std::str::FromStr for RevocationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(RevocationBackend::MySql),
            "redis" => Ok(RevocationBackend::Redis),
            "memory" => Ok(RevocationBackend::Memory),
            _ => Err(format!("Invalid revocation backend: {}", s)),
        }
    }
}

/// What a revocation lookup answers when the durable tier cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the credential as not revoked
    #[default]
    FailOpen,
    /// Treat the credential as revoked
    FailClosed,
}

impl FailurePolicy {
    /// Lookup result to use when the durable tier errored or timed out
    pub fn unavailable_verdict(&self) -> bool {
        matches!(self, FailurePolicy::FailClosed)
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_open" | "open" => Ok(FailurePolicy::FailOpen),
            "fail_closed" | "closed" => Ok(FailurePolicy::FailClosed),
            _ => Err(format!("Invalid failure policy: {}", s)),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailOpen => write!(f, "fail_open"),
            FailurePolicy::FailClosed => write!(f, "fail_closed"),
        }
    }
}

/// Revocation store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevocationConfig {
    /// Durable tier implementation
    pub backend: RevocationBackend,

    /// Verdict when the durable tier is unavailable
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Upper bound for a durable read, in milliseconds
    pub read_timeout_ms: u64,

    /// Upper bound for a durable write, in milliseconds
    pub write_timeout_ms: u64,

    /// Period of the expiry sweep, in seconds
    pub sweep_interval_secs: u64,

    /// Consecutive durable write failures that raise the operational alarm
    pub write_alarm_threshold: u32,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            backend: RevocationBackend::MySql,
            failure_policy: FailurePolicy::FailOpen,
            read_timeout_ms: 250,
            write_timeout_ms: 1000,
            sweep_interval_secs: 300,
            write_alarm_threshold: 5,
        }
    }
}

impl RevocationConfig {
    /// Timeouts, the sweep interval and the alarm threshold must be non-zero.
    /// An unrecognised failure policy is rejected rather than defaulted.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            backend: parse_var(lookup, "REVOCATION_BACKEND", defaults.backend)?,
            failure_policy: parse_var(lookup, "REVOCATION_FAILURE_POLICY", defaults.failure_policy)?,
            read_timeout_ms: parse_nonzero(
                lookup,
                "REVOCATION_READ_TIMEOUT_MS",
                defaults.read_timeout_ms,
            )?,
            write_timeout_ms: parse_nonzero(
                lookup,
                "REVOCATION_WRITE_TIMEOUT_MS",
                defaults.write_timeout_ms,
            )?,
            sweep_interval_secs: parse_nonzero(
                lookup,
                "REVOCATION_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            )?,
            write_alarm_threshold: parse_nonzero(
                lookup,
                "REVOCATION_WRITE_ALARM_THRESHOLD",
                defaults.write_alarm_threshold,
            )?,
        })
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Role cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleCacheConfig {
    /// Age at which a cached role is treated as absent, in seconds
    pub ttl_secs: u64,

    /// Period of the memory-reclaiming sweep, in seconds
    pub sweep_interval_secs: u64,
}

impl Default for RoleCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 900,
        }
    }
}

impl RoleCacheConfig {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            ttl_secs: parse_var(lookup, "ROLE_CACHE_TTL_SECS", defaults.ttl_secs)?,
            sweep_interval_secs: parse_nonzero(
                lookup,
                "ROLE_CACHE_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            )?,
        })
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup_from;

    #[test]
    fn test_failure_policy_verdicts() {
        assert!(!FailurePolicy::FailOpen.unavailable_verdict());
        assert!(FailurePolicy::FailClosed.unavailable_verdict());
    }

    #[test]
    fn test_failure_policy_parsing() {
        assert_eq!("fail-closed".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailClosed);
        assert_eq!("OPEN".parse::<FailurePolicy>().unwrap(), FailurePolicy::FailOpen);
        assert!("sometimes".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_revocation_config_defaults() {
        let config = RevocationConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.write_alarm_threshold, 5);
    }

    #[test]
    fn test_revocation_config_overrides() {
        let lookup = lookup_from(&[
            ("REVOCATION_BACKEND", "memory"),
            ("REVOCATION_READ_TIMEOUT_MS", "50"),
            ("REVOCATION_WRITE_ALARM_THRESHOLD", "2"),
        ]);
        let config = RevocationConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.backend, RevocationBackend::Memory);
        assert_eq!(config.read_timeout_ms, 50);
        assert_eq!(config.write_alarm_threshold, 2);
    }

    #[test]
    fn test_misspelled_failure_policy_is_fatal() {
        let lookup = lookup_from(&[("REVOCATION_FAILURE_POLICY", "failclosed")]);
        let err = RevocationConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("Invalid failure policy"));

        let lookup = lookup_from(&[("REVOCATION_BACKEND", "postgres")]);
        assert!(RevocationConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_zero_intervals_and_threshold_are_rejected() {
        for key in [
            "REVOCATION_SWEEP_INTERVAL_SECS",
            "REVOCATION_WRITE_ALARM_THRESHOLD",
            "REVOCATION_READ_TIMEOUT_MS",
            "REVOCATION_WRITE_TIMEOUT_MS",
        ] {
            let lookup = lookup_from(&[(key, "0")]);
            let err = RevocationConfig::from_lookup(&lookup).unwrap_err();
            assert!(err.to_string().contains(key), "{key}");
        }

        let lookup = lookup_from(&[("ROLE_CACHE_SWEEP_INTERVAL_SECS", "0")]);
        assert!(RoleCacheConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_role_cache_config() {
        let config = RoleCacheConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(3600));
        assert_eq!(config.sweep_interval(), Duration::from_secs(900));

        let lookup = lookup_from(&[("ROLE_CACHE_TTL_SECS", "60")]);
        let config = RoleCacheConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.ttl(), Duration::from_secs(60));
    }
}
