use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wd_core::{Principal, RefreshedAccess, Role, SignOutOutcome, WriteOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<RefreshedAccess> for RefreshResponse {
    fn from(refreshed: RefreshedAccess) -> Self {
        Self {
            access_token: refreshed.access_token,
            token_type: String::from("Bearer"),
            expires_in: refreshed.expires_in,
        }
    }
}

/// Sign-out body; the refresh credential is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignOutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignOutResponse {
    pub message: String,
    pub access: WriteOutcome,
    pub refresh: Option<WriteOutcome>,
}

impl From<SignOutOutcome> for SignOutResponse {
    fn from(outcome: SignOutOutcome) -> Self {
        Self {
            message: String::from("Signed out"),
            access: outcome.access,
            refresh: outcome.refresh,
        }
    }
}

/// The caller as the gate sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub image: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Principal> for MeResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.subject_id.clone(),
            email: principal.email.clone(),
            name: principal.name.clone(),
            role: principal.role,
            image: principal.image.clone(),
            issued_at: principal.issued_at,
            expires_at: principal.expires_at,
        }
    }
}
