//! Shared builders for service tests

use std::sync::Arc;
use std::time::Duration;
use wd_shared::config::FailurePolicy;

use crate::domain::entities::identity::{Identity, Role};
use crate::repositories::{InMemoryRevocationRepository, MockIdentityRepository};
use crate::services::revocation::{RevocationStore, RevocationStoreConfig};
use crate::services::role_cache::RoleCache;
use crate::services::secrets::SigningSecrets;
use crate::services::token::{TokenCodec, TokenService, TokenServiceConfig};

pub const ACCESS_SECRET: &str = "test-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &str = "test-refresh-secret-0123456789abcdef";

pub fn secrets() -> SigningSecrets {
    SigningSecrets::new(ACCESS_SECRET, REFRESH_SECRET).unwrap()
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(&secrets(), TokenServiceConfig::default())
}

pub fn ada() -> Identity {
    Identity::new("user-ada", "ada@example.com", "Ada Lovelace", Role::Admin)
}

pub fn bob() -> Identity {
    Identity::new("user-bob", "bob@example.com", "Bob", Role::User)
}

pub fn store_config() -> RevocationStoreConfig {
    RevocationStoreConfig {
        read_timeout: Duration::from_millis(100),
        write_timeout: Duration::from_millis(100),
        failure_policy: FailurePolicy::FailOpen,
        write_alarm_threshold: 5,
    }
}

/// Token service over a fresh in-memory durable tier
pub fn token_service() -> (Arc<TokenService>, InMemoryRevocationRepository) {
    let durable = InMemoryRevocationRepository::new();
    let store = Arc::new(RevocationStore::new(Arc::new(durable.clone()), store_config()));
    (Arc::new(TokenService::new(codec(), store)), durable)
}

pub struct GateFixture {
    pub tokens: Arc<TokenService>,
    pub roles: Arc<RoleCache>,
    pub identities: MockIdentityRepository,
    pub durable: InMemoryRevocationRepository,
}

pub async fn gate_fixture() -> GateFixture {
    let (tokens, durable) = token_service();
    let identities = MockIdentityRepository::new();
    identities.insert(ada()).await;
    identities.insert(bob()).await;

    GateFixture {
        tokens,
        roles: Arc::new(RoleCache::new(Duration::from_secs(3600))),
        identities,
        durable,
    }
}
