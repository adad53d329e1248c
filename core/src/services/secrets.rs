//! Signing secret provisioning
//!
//! Runs once at startup, before any credential is issued or verified. In
//! production and staging a missing or weak secret is a fatal
//! [`ConfigError`]. In development a placeholder is substituted and a
//! warning is logged.

use std::fmt;
use tracing::warn;
use wd_shared::config::{Environment, JwtConfig};

use crate::errors::ConfigError;

/// Minimum secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

pub const ACCESS_SECRET_VAR: &str = "JWT_SECRET";
pub const REFRESH_SECRET_VAR: &str = "JWT_REFRESH_SECRET";

const DEV_ACCESS_PLACEHOLDER: &str = "dev-only-insecure-access-secret-change-before-deployment";
const DEV_REFRESH_PLACEHOLDER: &str = "dev-only-insecure-refresh-secret-change-before-deployment";

/// Raw signing key bytes. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.0.len())
    }
}

/// The two process-wide signing secrets
#[derive(Debug, Clone)]
pub struct SigningSecrets {
    access: SecretKey,
    refresh: SecretKey,
    placeholder: bool,
}

impl SigningSecrets {
    /// Build from explicit values with the strict checks applied
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Result<Self, ConfigError> {
        let access = SecretKey::new(access);
        let refresh = SecretKey::new(refresh);
        check_strength(ACCESS_SECRET_VAR, &access)?;
        check_strength(REFRESH_SECRET_VAR, &refresh)?;
        if access == refresh {
            return Err(ConfigError::SharedSecret);
        }

        Ok(Self {
            access,
            refresh,
            placeholder: false,
        })
    }

    pub fn access(&self) -> &SecretKey {
        &self.access
    }

    pub fn refresh(&self) -> &SecretKey {
        &self.refresh
    }

    /// True when at least one secret is a development placeholder
    pub fn uses_placeholder(&self) -> bool {
        self.placeholder
    }
}

fn check_strength(name: &'static str, key: &SecretKey) -> Result<(), ConfigError> {
    if key.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::WeakSecret {
            name,
            min: MIN_SECRET_LENGTH,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Resolves the signing secrets from configuration
pub struct SecretProvisioner;

impl SecretProvisioner {
    /// Resolve and validate both secrets for `environment`
    ///
    /// # Returns
    /// * `Ok(SigningSecrets)` - Secrets ready for the token codec
    /// * `Err(ConfigError)` - Startup must abort
    pub fn provision(config: &JwtConfig, environment: Environment) -> Result<SigningSecrets, ConfigError> {
        if environment.is_strict() {
            let access = config
                .access_secret
                .clone()
                .ok_or(ConfigError::MissingSecret {
                    name: ACCESS_SECRET_VAR,
                })?;
            let refresh = config
                .refresh_secret
                .clone()
                .ok_or(ConfigError::MissingSecret {
                    name: REFRESH_SECRET_VAR,
                })?;
            return SigningSecrets::new(access, refresh);
        }

        let mut placeholder = false;
        let access = Self::development_secret(
            ACCESS_SECRET_VAR,
            config.access_secret.as_deref(),
            DEV_ACCESS_PLACEHOLDER,
            &mut placeholder,
        );
        let refresh = Self::development_secret(
            REFRESH_SECRET_VAR,
            config.refresh_secret.as_deref(),
            DEV_REFRESH_PLACEHOLDER,
            &mut placeholder,
        );
        if access == refresh {
            warn!("Access and refresh secrets are identical; set distinct values before deploying");
        }

        Ok(SigningSecrets {
            access,
            refresh,
            placeholder,
        })
    }

    fn development_secret(
        name: &'static str,
        configured: Option<&str>,
        fallback: &str,
        placeholder: &mut bool,
    ) -> SecretKey {
        match configured {
            Some(value) => {
                let key = SecretKey::new(value);
                if let Err(err) = check_strength(name, &key) {
                    warn!("{}; accepted in development only", err);
                }
                key
            }
            None => {
                warn!(
                    "{} is not set; using an insecure development placeholder",
                    name
                );
                *placeholder = true;
                SecretKey::new(fallback)
            }
        }
    }
}
