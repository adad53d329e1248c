//! Revocation store
//!
//! Two tiers: an in-process [`MemoryTier`](crate::repositories::MemoryTier)
//! consulted first, and a durable [`RevocationRepository`](crate::repositories::RevocationRepository)
//! shared by every instance. Writes go to both. Reads short-circuit on a
//! memory hit.

mod store;

#[cfg(test)]
mod tests;

pub use store::{RevocationHealth, RevocationStore, RevocationStoreConfig, WriteOutcome};
