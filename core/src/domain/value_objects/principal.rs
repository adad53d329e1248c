//! The verified caller attached to a request

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::identity::Role;
use crate::domain::entities::token::Claims;
use crate::errors::TokenError;

/// Verified principal derived from a valid access credential.
///
/// Built fresh for each request and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub image: Option<String>,
    #[serde(skip)]
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn from_claims(claims: Claims) -> Result<Self, TokenError> {
        let issued_at = claims.issued_at().ok_or(TokenError::Malformed)?;
        let expires_at = claims.expires_at().ok_or(TokenError::Malformed)?;
        let role = claims.role_or_default();

        Ok(Self {
            subject_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role,
            image: claims.image,
            jti: claims.jti,
            issued_at,
            expires_at,
        })
    }

    /// Copy of this principal carrying the authoritative role
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}
