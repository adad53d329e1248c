//! Token module for credential management
//!
//! This module handles all credential-related operations including:
//! - Access and refresh credential generation
//! - Signature, type and expiry verification
//! - Revocation checks against the revocation store

mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
pub use service::TokenService;
