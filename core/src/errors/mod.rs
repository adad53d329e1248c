//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{PersistenceError, TokenError};
pub use wd_shared::ConfigError;

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// Every credential failure collapses to this at the gate boundary
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DomainError {
    /// Whether a client should see this as 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DomainError::Unauthorized | DomainError::Token(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
