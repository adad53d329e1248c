//! # Warden Core
//!
//! Credential issuance and revocation for the Warden service.
//! This crate contains the domain entities, error types, repository
//! interfaces and the services that mint, verify and invalidate bearer
//! credentials:
//!
//! - [`services::secrets`] validates the two signing secrets at startup
//! - [`services::token`] encodes and verifies access and refresh credentials
//! - [`services::revocation`] is the two-tier denylist
//! - [`services::role_cache`] caches identity roles for a short window
//! - [`services::gate`] composes the above into `authenticate`
//! - [`services::authority`] is the facade handed to the HTTP layer

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::{
    IdentityRepository, InMemoryRevocationRepository, MockIdentityRepository, RevocationRepository,
};
pub use services::*;
