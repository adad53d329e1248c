//! Revocation entries held by the denylist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a revocation entry covers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum RevocationScope {
    /// A single credential, keyed by its `jti`
    Token { jti: String },
    /// Every credential of one identity issued at or before the revocation
    Identity { subject_id: String },
}

impl RevocationScope {
    /// Storage key. Token and identity keys never collide.
    pub fn key(&self) -> String {
        match self {
            RevocationScope::Token { jti } => format!("jti:{}", jti),
            RevocationScope::Identity { subject_id } => format!("sub:{}", subject_id),
        }
    }

    pub fn subject_id(&self) -> Option<&str> {
        match self {
            RevocationScope::Identity { subject_id } => Some(subject_id),
            RevocationScope::Token { .. } => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, RevocationScope::Identity { .. })
    }
}

/// One denylist entry.
///
/// For identity entries `revoked_at` is the cut-off: credentials whose `iat`
/// is at or before it are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    pub scope: RevocationScope,
    /// After this instant the entry is inert and eligible for sweeping
    pub expires_at: DateTime<Utc>,
    pub reason: String,
    pub revoked_at: DateTime<Utc>,
}

impl RevocationEntry {
    pub fn token(jti: impl Into<String>, expires_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            scope: RevocationScope::Token { jti: jti.into() },
            expires_at,
            reason: reason.into(),
            revoked_at: Utc::now(),
        }
    }

    pub fn identity(
        subject_id: impl Into<String>,
        expires_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            scope: RevocationScope::Identity {
                subject_id: subject_id.into(),
            },
            expires_at,
            reason: reason.into(),
            revoked_at: Utc::now(),
        }
    }

    pub fn key(&self) -> String {
        self.scope.key()
    }

    /// Active while `expires_at` is strictly in the future
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Fold a later identity revocation into this one.
    ///
    /// Both the cut-off and the expiry only move forward.
    pub fn merge(&mut self, later: &RevocationEntry) {
        if later.expires_at > self.expires_at {
            self.expires_at = later.expires_at;
        }
        if later.revoked_at >= self.revoked_at {
            self.revoked_at = later.revoked_at;
            self.reason = later.reason.clone();
        }
    }
}

/// Counts of active entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationStats {
    pub total: usize,
    pub identity_revocations: usize,
    pub token_revocations: usize,
}
