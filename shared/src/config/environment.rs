//! Environment configuration module

use serde::{Deserialize, Serialize};

use super::{read_var, ConfigError};

/// Application runtime mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging/test environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Whether configuration problems must abort startup.
    ///
    /// Only development tolerates insecure fallbacks.
    pub fn is_strict(&self) -> bool {
        !self.is_development()
    }

    /// First of `ENVIRONMENT`, `ENV` and `RUST_ENV` that is set.
    ///
    /// Development only when none is set. An unrecognised value is an error,
    /// since falling back would loosen secret checks.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        for key in ["ENVIRONMENT", "ENV", "RUST_ENV"] {
            if let Some(value) = read_var(lookup, key) {
                return value
                    .parse()
                    .map_err(|err: String| ConfigError::invalid(key, &value, err));
            }
        }
        Ok(Environment::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Include source location in logs
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: default_log_format(),
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config for environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                source_location: true,
            },
            Environment::Staging => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                source_location: false,
            },
            Environment::Production => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                source_location: false,
            },
        }
    }

    /// Environment defaults, overridden by `LOG_LEVEL` / `LOG_FORMAT`
    pub fn from_lookup(
        env: Environment,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::for_environment(env);
        if let Some(level) = read_var(lookup, "LOG_LEVEL") {
            config.level = level.to_lowercase();
        }
        if let Some(format) = read_var(lookup, "LOG_FORMAT") {
            config.format = format
                .parse()
                .map_err(|err: String| ConfigError::invalid("LOG_FORMAT", &format, err))?;
        }
        Ok(config)
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup_from;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert!("invalid".parse::<Environment>().is_err());
    }

    #[test]
    fn test_strictness() {
        assert!(!Environment::Development.is_strict());
        assert!(Environment::Staging.is_strict());
        assert!(Environment::Production.is_strict());
    }

    #[test]
    fn test_environment_lookup_order() {
        let lookup = lookup_from(&[("ENV", "prod"), ("RUST_ENV", "dev")]);
        assert_eq!(Environment::from_lookup(&lookup).unwrap(), Environment::Production);

        let lookup = lookup_from(&[]);
        assert_eq!(Environment::from_lookup(&lookup).unwrap(), Environment::Development);
    }

    #[test]
    fn test_unrecognised_environment_is_fatal() {
        let lookup = lookup_from(&[("ENVIRONMENT", "bogus")]);
        let err = Environment::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("ENVIRONMENT=\"bogus\""));

        // a typo in the first variable is not masked by a later one
        let lookup = lookup_from(&[("ENV", "prodution"), ("RUST_ENV", "production")]);
        assert!(Environment::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_logging_overrides() {
        let lookup = lookup_from(&[("LOG_LEVEL", "WARN"), ("LOG_FORMAT", "compact")]);
        let config = LoggingConfig::from_lookup(Environment::Production, &lookup).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Compact);

        let lookup = lookup_from(&[("LOG_FORMAT", "xml")]);
        assert!(LoggingConfig::from_lookup(Environment::Production, &lookup).is_err());
    }
}
