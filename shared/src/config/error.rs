//! Startup configuration failures

use thiserror::Error;

/// Configuration that cannot be trusted. Always fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Signing secret {name} is not configured")]
    MissingSecret { name: &'static str },

    #[error("Signing secret {name} is too short: {actual} bytes (minimum {min})")]
    WeakSecret {
        name: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("Access and refresh signing secrets must differ")]
    SharedSecret,

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(key: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            message: format!("{}={:?} ({})", key, value, reason),
        }
    }
}
