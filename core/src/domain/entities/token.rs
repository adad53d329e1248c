//! Credential claims and token pair types

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::identity::{Identity, Role};

/// Access credential lifetime (1 hour)
pub const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 60 * 60;

/// Refresh credential lifetime (7 days)
pub const REFRESH_TOKEN_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The two credential classes. Serialized into the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    Access,
    Refresh,
}

impl CredentialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialType::Access => "access",
            CredentialType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims carried by both credential classes.
///
/// Refresh credentials carry only `sub` and `email` plus the registered
/// claims. Profile fields are present on access credentials only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity id)
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub token_type: CredentialType,
    /// Unique credential id, the revocation key
    pub jti: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration time (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    /// Claims for an access credential issued now
    pub fn new_access(identity: &Identity, lifetime_seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            name: Some(identity.name.clone()),
            role: Some(identity.role),
            image: identity.image.clone(),
            token_type: CredentialType::Access,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime_seconds,
        }
    }

    /// Minimal claims for a refresh credential issued now
    pub fn new_refresh(identity: &Identity, lifetime_seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            name: None,
            role: None,
            image: None,
            token_type: CredentialType::Refresh,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime_seconds,
        }
    }

    /// Role claim, defaulting to `user` when absent
    pub fn role_or_default(&self) -> Role {
        self.role.unwrap_or_default()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Expired once `exp` is at or before `now` (seconds since epoch)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// Access and refresh credentials issued together at sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access credential lifetime in seconds
    pub expires_in: i64,
    /// Refresh credential lifetime in seconds
    pub refresh_expires_in: i64,
}
