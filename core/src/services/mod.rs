//! Business services

pub mod authority;
pub mod gate;
pub mod revocation;
pub mod role_cache;
pub mod secrets;
pub mod sweeper;
pub mod token;

#[cfg(test)]
pub(crate) mod fixtures;

pub use authority::{AuthorityConfig, AuthorityHealth, CredentialAuthority};
pub use gate::{RefreshedAccess, SignOutOutcome, VerificationGate};
pub use revocation::{RevocationHealth, RevocationStore, RevocationStoreConfig, WriteOutcome};
pub use role_cache::{RoleCache, RoleCacheStats};
pub use secrets::{SecretKey, SecretProvisioner, SigningSecrets, MIN_SECRET_LENGTH};
pub use sweeper::{BackgroundSweeper, SweepHandle, Sweepable};
pub use token::{TokenCodec, TokenService, TokenServiceConfig};
