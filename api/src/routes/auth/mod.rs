//! Authentication route handlers
//!
//! Credentials are minted by the identity flow that owns sign-in; these
//! endpoints only refresh, introspect and revoke them.

pub mod me;
pub mod refresh;
pub mod signout;
