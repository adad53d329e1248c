//! Signing secret and credential lifetime configuration

use serde::{Deserialize, Serialize};

use super::{parse_var, read_var, ConfigError};

/// Access credential lifetime in seconds (1 hour)
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;

/// Refresh credential lifetime in seconds (7 days)
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604_800;

/// JWT signing configuration
///
/// The two secrets are raw configuration values. They are validated by the
/// secret provisioner in `wd_core` before any credential can be minted.
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign access credentials
    pub access_secret: Option<String>,

    /// Secret used to sign refresh credentials
    pub refresh_secret: Option<String>,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: None,
            refresh_secret: None,
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &self.access_secret.as_ref().map(|_| "<redacted>"))
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Create a configuration with both secrets set
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: Some(access_secret.into()),
            refresh_secret: Some(refresh_secret.into()),
            ..Default::default()
        }
    }

    /// The access secret comes from `JWT_SECRET` (or `NEXTAUTH_SECRET`); the
    /// refresh secret only from `JWT_REFRESH_SECRET`, so the two classes never
    /// silently share a key.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            access_secret: read_var(lookup, "JWT_SECRET")
                .or_else(|| read_var(lookup, "NEXTAUTH_SECRET")),
            refresh_secret: read_var(lookup, "JWT_REFRESH_SECRET"),
            access_token_expiry: parse_lifetime(
                lookup,
                "JWT_ACCESS_TOKEN_EXPIRY",
                DEFAULT_ACCESS_TOKEN_EXPIRY,
            )?,
            refresh_token_expiry: parse_lifetime(
                lookup,
                "JWT_REFRESH_TOKEN_EXPIRY",
                DEFAULT_REFRESH_TOKEN_EXPIRY,
            )?,
        })
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }
}

/// Credential lifetimes must be positive
fn parse_lifetime(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    let secs = parse_var(lookup, key, default)?;
    if secs <= 0 {
        return Err(ConfigError::invalid(key, &secs.to_string(), "must be a positive number of seconds"));
    }
    Ok(secs)
}
