//! Shared configuration and response types for the Warden service
//!
//! This crate provides functionality used across all server crates:
//! - Environment-driven configuration types
//! - The JSON error response body returned by the HTTP layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, Environment, LoggingConfig, LogFormat,
    DatabaseConfig, JwtConfig, CacheConfig, ServerConfig,
    RevocationConfig, RevocationBackend, FailurePolicy, RoleCacheConfig,
};
pub use errors::{ErrorResponse, error_codes};
