//! Domain layer containing entities and value objects

pub mod entities;
pub mod value_objects;

pub use entities::{
    Claims, CredentialType, Identity, RevocationEntry, RevocationScope, RevocationStats, Role,
    TokenPair,
};
pub use value_objects::Principal;
