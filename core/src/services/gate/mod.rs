//! Verification gate
//!
//! Turns a raw bearer credential into a verified [`Principal`](crate::domain::Principal)
//! and exposes the refresh and sign-out flows built on the same checks.

mod verification;

#[cfg(test)]
mod tests;

pub use verification::{RefreshedAccess, SignOutOutcome, VerificationGate};
