//! Shared wiring for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use wd_api::AppState;
use wd_core::{
    AuthorityConfig, CredentialAuthority, Identity, InMemoryRevocationRepository,
    MockIdentityRepository, Role, SigningSecrets,
};

pub const ACCESS_SECRET: &str = "integration-access-secret-0123456789abcdef";
pub const REFRESH_SECRET: &str = "integration-refresh-secret-fedcba9876543210";

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub authority: Arc<CredentialAuthority>,
    pub identities: MockIdentityRepository,
    pub durable: InMemoryRevocationRepository,
}

pub fn ada() -> Identity {
    Identity::new("user-ada", "ada@example.com", "Ada", Role::Admin)
}

pub fn bob() -> Identity {
    Identity::new("user-bob", "bob@example.com", "Bob", Role::User)
}

pub async fn context() -> TestContext {
    let secrets = SigningSecrets::new(ACCESS_SECRET, REFRESH_SECRET).expect("valid test secrets");
    let identities = MockIdentityRepository::new();
    identities.insert(ada()).await;
    identities.insert(bob()).await;
    let durable = InMemoryRevocationRepository::new();

    let authority = Arc::new(CredentialAuthority::new(
        &secrets,
        Arc::new(durable.clone()),
        Arc::new(identities.clone()),
        AuthorityConfig::default(),
    ));

    TestContext {
        state: web::Data::new(AppState::new(authority.clone())),
        authority,
        identities,
        durable,
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
