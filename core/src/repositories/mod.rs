//! Repository interfaces for data access
//!
//! This module defines the storage seams the core services depend on.
//! Implementations live in the infrastructure crate, except for the
//! in-memory ones here, which back the process-local tier and tests.

pub mod identity;
pub mod revocation;

pub use identity::{IdentityRepository, MockIdentityRepository};
pub use revocation::{InMemoryRevocationRepository, MemoryTier, RevocationRepository};
