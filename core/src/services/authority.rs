//! The credential authority: one handle over every credential operation,
//! constructed at startup after the secrets are provisioned

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use wd_shared::config::AppConfig;

use crate::domain::entities::identity::{Identity, Role};
use crate::domain::entities::token::TokenPair;
use crate::domain::value_objects::Principal;
use crate::errors::DomainResult;
use crate::repositories::{IdentityRepository, RevocationRepository};
use crate::services::gate::{RefreshedAccess, SignOutOutcome, VerificationGate};
use crate::services::revocation::{RevocationHealth, RevocationStore, RevocationStoreConfig, WriteOutcome};
use crate::services::role_cache::RoleCache;
use crate::services::secrets::SigningSecrets;
use crate::services::sweeper::{BackgroundSweeper, SweepHandle};
use crate::services::token::{TokenCodec, TokenService, TokenServiceConfig};

#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    pub tokens: TokenServiceConfig,
    pub revocation: RevocationStoreConfig,
    pub revocation_sweep_interval: Duration,
    pub role_cache_ttl: Duration,
    pub role_sweep_interval: Duration,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            tokens: TokenServiceConfig::default(),
            revocation: RevocationStoreConfig::default(),
            revocation_sweep_interval: Duration::from_secs(5 * 60),
            role_cache_ttl: Duration::from_secs(60 * 60),
            role_sweep_interval: Duration::from_secs(15 * 60),
        }
    }
}

impl From<&AppConfig> for AuthorityConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            tokens: TokenServiceConfig::from(&config.jwt),
            revocation: RevocationStoreConfig::from(&config.revocation),
            revocation_sweep_interval: config.revocation.sweep_interval(),
            role_cache_ttl: config.role_cache.ttl(),
            role_sweep_interval: config.role_cache.sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorityHealth {
    pub revocation: RevocationHealth,
    pub cached_roles: usize,
    pub background_sweeps: usize,
}

pub struct CredentialAuthority {
    tokens: Arc<TokenService>,
    store: Arc<RevocationStore>,
    roles: Arc<RoleCache>,
    gate: VerificationGate,
    config: AuthorityConfig,
    sweeps: Mutex<Vec<SweepHandle>>,
}

impl CredentialAuthority {
    pub fn new(
        secrets: &SigningSecrets,
        durable: Arc<dyn RevocationRepository>,
        identities: Arc<dyn IdentityRepository>,
        config: AuthorityConfig,
    ) -> Self {
        let store = Arc::new(RevocationStore::new(durable, config.revocation.clone()));
        let codec = TokenCodec::new(secrets, config.tokens.clone());
        let tokens = Arc::new(TokenService::new(codec, store.clone()));
        let roles = Arc::new(RoleCache::new(config.role_cache_ttl));
        let gate = VerificationGate::new(tokens.clone(), roles.clone(), identities);

        Self {
            tokens,
            store,
            roles,
            gate,
            config,
            sweeps: Mutex::new(Vec::new()),
        }
    }

    pub fn issue_access(&self, identity: &Identity) -> DomainResult<String> {
        Ok(self.tokens.issue_access(identity)?)
    }

    pub fn issue_refresh(&self, identity: &Identity) -> DomainResult<String> {
        Ok(self.tokens.issue_refresh(identity)?)
    }

    pub fn issue_pair(&self, identity: &Identity) -> DomainResult<TokenPair> {
        Ok(self.tokens.issue_pair(identity)?)
    }

    /// Issue a credential pair at sign-in and prime the role cache
    pub async fn sign_in(&self, identity: &Identity) -> DomainResult<TokenPair> {
        let pair = self.issue_pair(identity)?;
        self.roles.set(&identity.email, identity.role).await;
        info!(subject = %identity.id, "Issued credential pair");
        Ok(pair)
    }

    pub async fn authenticate(&self, credential: &str) -> DomainResult<Principal> {
        self.gate.authenticate(credential).await
    }

    pub async fn authorize(&self, credential: &str, required: Role) -> DomainResult<Principal> {
        self.gate.authorize(credential, required).await
    }

    pub async fn refresh(&self, refresh_credential: &str) -> DomainResult<RefreshedAccess> {
        self.gate.refresh(refresh_credential).await
    }

    pub async fn sign_out(&self, principal: &Principal, refresh_credential: Option<&str>) -> SignOutOutcome {
        self.gate.sign_out(principal, refresh_credential).await
    }

    pub async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>, reason: &str) -> WriteOutcome {
        self.store.revoke_token(jti, expires_at, reason).await
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.store.is_revoked(jti).await
    }

    /// Reject every credential issued to `subject_id` up to now.
    ///
    /// The entry lives as long as the longest credential that could still
    /// be outstanding.
    pub async fn revoke_all_for_identity(&self, subject_id: &str, reason: &str) -> WriteOutcome {
        let expires_at = Utc::now() + ChronoDuration::seconds(self.tokens.refresh_lifetime());
        self.store
            .revoke_all_for_identity(subject_id, expires_at, reason)
            .await
    }

    pub async fn is_identity_revoked(&self, subject_id: &str) -> bool {
        self.store.is_identity_revoked(subject_id).await
    }

    pub async fn cache_role(&self, email: &str, role: Role) {
        self.roles.set(email, role).await;
    }

    pub async fn invalidate_role(&self, email: &str) -> bool {
        self.roles.invalidate(email).await
    }

    pub fn role_cache(&self) -> &Arc<RoleCache> {
        &self.roles
    }

    pub fn revocation_store(&self) -> &Arc<RevocationStore> {
        &self.store
    }

    pub fn access_lifetime(&self) -> i64 {
        self.tokens.access_lifetime()
    }

    pub async fn health(&self) -> AuthorityHealth {
        AuthorityHealth {
            revocation: self.store.health().await,
            cached_roles: self.roles.entry_count().await,
            background_sweeps: self.sweeps.lock().await.len(),
        }
    }

    /// Start the revocation and role cache sweepers. Calling this again while
    /// they run does nothing.
    pub async fn start_background_sweeps(&self) {
        let mut sweeps = self.sweeps.lock().await;
        if !sweeps.is_empty() {
            return;
        }

        sweeps.push(
            BackgroundSweeper::new(self.store.clone(), self.config.revocation_sweep_interval).spawn(),
        );
        sweeps.push(BackgroundSweeper::new(self.roles.clone(), self.config.role_sweep_interval).spawn());
    }

    /// Stop background sweeps and wait for them to exit
    pub async fn shutdown(&self) {
        let handles: Vec<SweepHandle> = self.sweeps.lock().await.drain(..).collect();
        for handle in handles {
            handle.stop().await;
        }
        info!("Credential authority shut down");
    }
}
