//! MySQL repository implementations

pub mod identity_repository_impl;
pub mod revocation_repository_impl;

pub use identity_repository_impl::MySqlIdentityRepository;
pub use revocation_repository_impl::MySqlRevocationRepository;

use wd_core::errors::{DomainError, PersistenceError};

/// Wrap a SQLx failure as an unavailable durable tier
pub(crate) fn unavailable(operation: &str, error: sqlx::Error) -> DomainError {
    PersistenceError::Unavailable {
        message: format!("{} failed: {}", operation, error),
    }
    .into()
}
