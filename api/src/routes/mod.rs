//! Route handlers
//!
//! - `health` - liveness plus revocation store state
//! - `auth` - refresh, sign-out and caller introspection
//! - `admin` - identity-wide revocation

pub mod admin;
pub mod auth;
pub mod health;
