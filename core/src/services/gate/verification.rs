use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::identity::{Identity, Role};
use crate::domain::value_objects::Principal;
use crate::errors::{DomainError, TokenError};
use crate::repositories::IdentityRepository;
use crate::services::revocation::WriteOutcome;
use crate::services::role_cache::RoleCache;
use crate::services::token::TokenService;

/// New access credential returned by [`VerificationGate::refresh`]
#[derive(Debug, Clone, Serialize)]
pub struct RefreshedAccess {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(skip)]
    pub identity: Identity,
}

/// What sign-out revoked
#[derive(Debug, Clone, Serialize)]
pub struct SignOutOutcome {
    pub access: WriteOutcome,
    pub refresh: Option<WriteOutcome>,
}

impl SignOutOutcome {
    pub fn is_durable(&self) -> bool {
        self.access.is_durable() && self.refresh.map_or(true, |outcome| outcome.is_durable())
    }
}

/// Composes the token codec, revocation store and role cache.
///
/// Every credential failure is logged with its reason and reported to the
/// caller as [`DomainError::Unauthorized`].
pub struct VerificationGate {
    tokens: Arc<TokenService>,
    roles: Arc<RoleCache>,
    identities: Arc<dyn IdentityRepository>,
}

impl VerificationGate {
    pub fn new(
        tokens: Arc<TokenService>,
        roles: Arc<RoleCache>,
        identities: Arc<dyn IdentityRepository>,
    ) -> Self {
        Self {
            tokens,
            roles,
            identities,
        }
    }

    /// Verify an access credential and build the request principal
    ///
    /// # Returns
    /// * `Ok(Principal)` - Valid, unexpired, unrevoked access credential
    /// * `Err(DomainError::Unauthorized)` - Anything else
    pub async fn authenticate(&self, credential: &str) -> Result<Principal, DomainError> {
        let claims = match self.tokens.codec().decode_access(credential) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(reason = %e, "Rejected access credential");
                if matches!(e, TokenError::Expired | TokenError::WrongCredentialType { .. }) {
                    if let Some(email) = self.tokens.codec().signed_email(credential) {
                        self.roles.invalidate(&email).await;
                    }
                }
                return Err(DomainError::Unauthorized);
            }
        };

        if let Err(e) = self.tokens.check_revocation(&claims).await {
            debug!(reason = %e, subject = %claims.sub, "Rejected access credential");
            self.roles.invalidate(&claims.email).await;
            return Err(DomainError::Unauthorized);
        }

        let email = claims.email.clone();
        match Principal::from_claims(claims) {
            Ok(principal) => Ok(principal),
            Err(e) => {
                debug!(reason = %e, "Rejected access credential");
                self.roles.invalidate(&email).await;
                Err(DomainError::Unauthorized)
            }
        }
    }

    /// Authenticate and require at least `required`
    ///
    /// The role comes from the role cache, falling back to the identity
    /// directory, so demotions take effect without waiting for the
    /// credential to expire.
    pub async fn authorize(&self, credential: &str, required: Role) -> Result<Principal, DomainError> {
        let principal = self.authenticate(credential).await?;
        let role = self.current_role(&principal).await?;

        if !role.satisfies(required) {
            warn!(
                subject = %principal.subject_id,
                role = %role,
                required = %required,
                "Insufficient role"
            );
            self.roles.invalidate(&principal.email).await;
            return Err(DomainError::Forbidden);
        }

        Ok(principal.with_role(role))
    }

    async fn current_role(&self, principal: &Principal) -> Result<Role, DomainError> {
        if let Some(role) = self.roles.get(&principal.email).await {
            return Ok(role);
        }

        match self
            .identities
            .find_identity(&principal.subject_id, &principal.email)
            .await
        {
            Ok(Some(identity)) => {
                self.roles.set(&identity.email, identity.role).await;
                Ok(identity.role)
            }
            Ok(None) => {
                debug!(subject = %principal.subject_id, "Identity no longer exists");
                Err(DomainError::Unauthorized)
            }
            Err(e) => {
                error!("Role lookup failed, treating caller as user: {}", e);
                Ok(Role::User)
            }
        }
    }

    /// Exchange a refresh credential for a new access credential
    ///
    /// The refresh credential is not rotated. The identity is re-read so the
    /// new access credential carries the current profile and role.
    pub async fn refresh(&self, refresh_credential: &str) -> Result<RefreshedAccess, DomainError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_credential)
            .await
            .map_err(|e| {
                debug!(reason = %e, "Rejected refresh credential");
                DomainError::Unauthorized
            })?;

        let identity = match self.identities.find_identity(&claims.sub, &claims.email).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                debug!(subject = %claims.sub, "Refresh for unknown identity");
                return Err(DomainError::Unauthorized);
            }
            Err(e) => {
                error!("Identity lookup failed during refresh: {}", e);
                return Err(DomainError::Internal {
                    message: "identity lookup failed".to_string(),
                });
            }
        };

        self.roles.set(&identity.email, identity.role).await;
        let access_token = self.tokens.issue_access(&identity)?;
        info!(subject = %identity.id, "Issued access credential from refresh");

        Ok(RefreshedAccess {
            access_token,
            expires_in: self.tokens.access_lifetime(),
            identity,
        })
    }

    /// Revoke the caller's access credential and, when supplied, their
    /// refresh credential
    ///
    /// A refresh credential that does not verify or belongs to another
    /// subject is ignored.
    pub async fn sign_out(
        &self,
        principal: &Principal,
        refresh_credential: Option<&str>,
    ) -> SignOutOutcome {
        let access = self
            .tokens
            .store()
            .revoke_token(&principal.jti, principal.expires_at, "User signout")
            .await;

        let refresh = match refresh_credential.map(|token| self.tokens.codec().decode_refresh(token)) {
            Some(Ok(claims)) if claims.sub == principal.subject_id => {
                Some(self.tokens.revoke_claims(&claims, "User signout").await)
            }
            Some(Ok(_)) => {
                warn!(subject = %principal.subject_id, "Sign-out with another subject's refresh credential");
                None
            }
            Some(Err(TokenError::Expired)) | None => None,
            Some(Err(e)) => {
                debug!(reason = %e, "Ignoring unverifiable refresh credential at sign-out");
                None
            }
        };

        self.roles.invalidate(&principal.email).await;
        info!(subject = %principal.subject_id, "Signed out");

        SignOutOutcome { access, refresh }
    }
}
