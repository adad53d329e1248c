use serde::{Deserialize, Serialize};
use wd_core::WriteOutcome;

pub const DEFAULT_REVOKE_REASON: &str = "Revoked by administrator";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevokeIdentityRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

impl RevokeIdentityRequest {
    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(DEFAULT_REVOKE_REASON)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeIdentityResponse {
    pub subject_id: String,
    pub outcome: WriteOutcome,
}
