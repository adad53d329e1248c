//! Credential encoding and verification

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use tracing::error;

use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{Claims, CredentialType, TokenPair};
use crate::errors::TokenError;
use crate::services::secrets::SigningSecrets;

use super::config::TokenServiceConfig;

/// Only the `type` claim, read before signature verification
#[derive(Deserialize)]
struct TypeProbe {
    #[serde(rename = "type")]
    token_type: CredentialType,
}

/// Signs and verifies both credential classes.
///
/// Each class has its own key and the `type` claim is checked before the
/// signature, so a credential of one class is never accepted as the other.
pub struct TokenCodec {
    config: TokenServiceConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
    lenient_validation: Validation,
    probe_validation: Validation,
}

impl TokenCodec {
    pub fn new(secrets: &SigningSecrets, config: TokenServiceConfig) -> Self {
        let access = secrets.access().as_bytes();
        let refresh = secrets.refresh().as_bytes();

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        // signature checked, expiry not
        let mut lenient_validation = validation.clone();
        lenient_validation.validate_exp = false;

        let mut probe_validation = Validation::new(config.algorithm);
        probe_validation.insecure_disable_signature_validation();
        probe_validation.validate_exp = false;
        probe_validation.required_spec_claims.clear();

        Self {
            access_encoding: EncodingKey::from_secret(access),
            access_decoding: DecodingKey::from_secret(access),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
            config,
            validation,
            lenient_validation,
            probe_validation,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issue an access credential carrying the identity's profile and role
    pub fn issue_access(&self, identity: &Identity) -> Result<String, TokenError> {
        let claims = Claims::new_access(identity, self.config.access_token_expiry_seconds);
        self.encode(&claims)
    }

    /// Issue a refresh credential carrying only `sub` and `email`
    pub fn issue_refresh(&self, identity: &Identity) -> Result<String, TokenError> {
        let claims = Claims::new_refresh(identity, self.config.refresh_token_expiry_seconds);
        self.encode(&claims)
    }

    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(identity)?,
            refresh_token: self.issue_refresh(identity)?,
            expires_in: self.config.access_token_expiry_seconds,
            refresh_expires_in: self.config.refresh_token_expiry_seconds,
        })
    }

    /// Verify signature, type and expiry of an access credential
    pub fn decode_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, CredentialType::Access)
    }

    /// Verify signature, type and expiry of a refresh credential
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, CredentialType::Refresh)
    }

    /// Email of a rejected credential, if its signature is valid under the
    /// key of its own class. Expiry is ignored.
    pub fn signed_email(&self, token: &str) -> Option<String> {
        let class = self.credential_type(token).ok()?;
        decode::<Claims>(token, self.decoding_key(class), &self.lenient_validation)
            .ok()
            .map(|data| data.claims.email)
    }

    /// Sign arbitrary claims with the key of their class
    pub(crate) fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let key = match claims.token_type {
            CredentialType::Access => &self.access_encoding,
            CredentialType::Refresh => &self.refresh_encoding,
        };

        encode(&Header::new(self.config.algorithm), claims, key).map_err(|e| {
            error!("Failed to encode {} credential: {}", claims.token_type, e);
            TokenError::GenerationFailed
        })
    }

    /// Unverified `type` claim
    fn credential_type(&self, token: &str) -> Result<CredentialType, TokenError> {
        decode::<TypeProbe>(token, &self.access_decoding, &self.probe_validation)
            .map(|data| data.claims.token_type)
            .map_err(|_| TokenError::Malformed)
    }

    fn decoding_key(&self, class: CredentialType) -> &DecodingKey {
        match class {
            CredentialType::Access => &self.access_decoding,
            CredentialType::Refresh => &self.refresh_decoding,
        }
    }

    fn decode(&self, token: &str, expected: CredentialType) -> Result<Claims, TokenError> {
        let found = self.credential_type(token)?;
        if found != expected {
            return Err(TokenError::WrongCredentialType { expected, found });
        }

        let claims = decode::<Claims>(token, self.decoding_key(expected), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        // jsonwebtoken still accepts exp == now
        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
