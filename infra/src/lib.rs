//! # Infrastructure Layer
//!
//! Concrete storage behind the Warden core:
//! - **Database**: MySQL revocation tier and identity directory using SQLx
//! - **Cache**: Redis client and the Redis revocation tier
//! - **Backends**: selection of the durable revocation tier from configuration

pub mod backends;
pub mod cache;
pub mod database;

pub use backends::{revocation_repository, Infrastructure};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection attempt exceeded its deadline
    #[error("Connection timed out: {0}")]
    Timeout(String),
}
