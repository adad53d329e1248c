//! Error definitions for credential handling and the durable revocation
//! tier.

use thiserror::Error;

use crate::domain::entities::token::CredentialType;

/// Credential verification and issuance failures.
///
/// These reasons are meant for logs. The verification gate reports every one
/// of them to callers as a single `Unauthorized`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Wrong credential type: expected {expected}, found {found}")]
    WrongCredentialType {
        expected: CredentialType,
        found: CredentialType,
    },

    #[error("Token revoked")]
    Revoked,

    #[error("Malformed token")]
    Malformed,

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Durable revocation tier I/O failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Durable tier unavailable: {message}")]
    Unavailable { message: String },

    #[error("Durable tier timed out after {millis}ms during {operation}")]
    Timeout { operation: &'static str, millis: u64 },
}
