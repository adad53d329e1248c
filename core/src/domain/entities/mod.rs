//! Domain entities

pub mod identity;
pub mod revocation;
pub mod token;

pub use identity::{Identity, Role};
pub use revocation::{RevocationEntry, RevocationScope, RevocationStats};
pub use token::{
    Claims, CredentialType, TokenPair, ACCESS_TOKEN_EXPIRY_SECONDS, REFRESH_TOKEN_EXPIRY_SECONDS,
};
