//! Token service: codec plus revocation checks

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{Claims, TokenPair};
use crate::errors::TokenError;
use crate::services::revocation::{RevocationStore, WriteOutcome};

use super::codec::TokenCodec;

/// Service for issuing and verifying credentials
///
/// Verification rejects credentials whose `jti` is on the denylist and
/// credentials issued at or before an identity-wide revocation.
pub struct TokenService {
    codec: TokenCodec,
    store: Arc<RevocationStore>,
}

impl TokenService {
    pub fn new(codec: TokenCodec, store: Arc<RevocationStore>) -> Self {
        Self { codec, store }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn store(&self) -> &Arc<RevocationStore> {
        &self.store
    }

    /// Access credential lifetime in seconds
    pub fn access_lifetime(&self) -> i64 {
        self.codec.config().access_token_expiry_seconds
    }

    /// Refresh credential lifetime in seconds
    pub fn refresh_lifetime(&self) -> i64 {
        self.codec.config().refresh_token_expiry_seconds
    }

    pub fn issue_access(&self, identity: &Identity) -> Result<String, TokenError> {
        self.codec.issue_access(identity)
    }

    pub fn issue_refresh(&self, identity: &Identity) -> Result<String, TokenError> {
        self.codec.issue_refresh(identity)
    }

    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.codec.issue_pair(identity)
    }

    /// Verify an access credential, including revocation
    ///
    /// # Returns
    /// * `Ok(Claims)` - Verified claims
    /// * `Err(TokenError)` - Bad signature, wrong type, expired, malformed or revoked
    pub async fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.codec.decode_access(token)?;
        self.check_revocation(&claims).await?;
        Ok(claims)
    }

    /// Verify a refresh credential, including revocation
    pub async fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.codec.decode_refresh(token)?;
        self.check_revocation(&claims).await?;
        Ok(claims)
    }

    /// Reject decoded claims that are covered by a revocation entry
    pub async fn check_revocation(&self, claims: &Claims) -> Result<(), TokenError> {
        if self.store.is_revoked(&claims.jti).await {
            debug!(jti = %claims.jti, "Credential is on the denylist");
            return Err(TokenError::Revoked);
        }

        if let Some(revoked_at) = self.store.identity_revoked_at(&claims.sub).await {
            if claims.iat <= revoked_at.timestamp() {
                debug!(subject = %claims.sub, "Credential predates identity revocation");
                return Err(TokenError::Revoked);
            }
        }

        Ok(())
    }

    /// Denylist an individual credential until its own expiry
    pub async fn revoke_claims(&self, claims: &Claims, reason: &str) -> WriteOutcome {
        let expires_at: DateTime<Utc> = claims.expires_at().unwrap_or_else(Utc::now);
        self.store.revoke_token(&claims.jti, expires_at, reason).await
    }
}
