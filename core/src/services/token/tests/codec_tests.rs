//! Unit tests for the token codec

use chrono::Utc;

use crate::domain::entities::identity::Role;
use crate::domain::entities::token::{Claims, CredentialType};
use crate::domain::value_objects::Principal;
use crate::errors::TokenError;
use crate::services::fixtures::{ada, bob, codec, ACCESS_SECRET, REFRESH_SECRET};
use crate::services::secrets::SigningSecrets;
use crate::services::token::{TokenCodec, TokenServiceConfig};

#[test]
fn test_issue_and_decode_access() {
    let codec = codec();
    let token = codec.issue_access(&ada()).unwrap();

    let claims = codec.decode_access(&token).unwrap();
    assert_eq!(claims.sub, "user-ada");
    assert_eq!(claims.email, "ada@example.com");
    assert_eq!(claims.role, Some(Role::Admin));
    assert_eq!(claims.token_type, CredentialType::Access);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_issue_and_decode_refresh() {
    let codec = codec();
    let token = codec.issue_refresh(&bob()).unwrap();

    let claims = codec.decode_refresh(&token).unwrap();
    assert_eq!(claims.sub, "user-bob");
    assert!(claims.name.is_none());
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
}

#[test]
fn test_credential_classes_are_not_interchangeable() {
    let codec = codec();
    let pair = codec.issue_pair(&ada()).unwrap();

    assert_eq!(
        codec.decode_access(&pair.refresh_token).unwrap_err(),
        TokenError::WrongCredentialType {
            expected: CredentialType::Access,
            found: CredentialType::Refresh,
        }
    );
    assert_eq!(
        codec.decode_refresh(&pair.access_token).unwrap_err(),
        TokenError::WrongCredentialType {
            expected: CredentialType::Refresh,
            found: CredentialType::Access,
        }
    );
}

#[test]
fn test_access_from_one_instance_is_wrong_type_for_another_refresh() {
    let first = codec();
    let other_refresh = "another-refresh-secret-0123456789abcdef";
    let second = TokenCodec::new(
        &SigningSecrets::new(ACCESS_SECRET, other_refresh).unwrap(),
        TokenServiceConfig::default(),
    );

    let access = first.issue_access(&ada()).unwrap();
    assert!(matches!(
        second.decode_refresh(&access),
        Err(TokenError::WrongCredentialType { .. })
    ));
}

#[test]
fn test_foreign_signature_is_rejected() {
    let foreign = TokenCodec::new(
        &SigningSecrets::new(
            "some-other-access-secret-0123456789abc",
            "some-other-refresh-secret-0123456789ab",
        )
        .unwrap(),
        TokenServiceConfig::default(),
    );
    let token = foreign.issue_access(&ada()).unwrap();

    assert_eq!(codec().decode_access(&token).unwrap_err(), TokenError::InvalidSignature);
}

#[test]
fn test_secrets_are_per_class() {
    // swapping the two secrets must break both classes
    let swapped = TokenCodec::new(
        &SigningSecrets::new(REFRESH_SECRET, ACCESS_SECRET).unwrap(),
        TokenServiceConfig::default(),
    );
    let pair = codec().issue_pair(&ada()).unwrap();

    assert_eq!(swapped.decode_access(&pair.access_token).unwrap_err(), TokenError::InvalidSignature);
    assert_eq!(swapped.decode_refresh(&pair.refresh_token).unwrap_err(), TokenError::InvalidSignature);
}

#[test]
fn test_expired_credential_is_rejected() {
    let codec = codec();
    let mut claims = Claims::new_access(&ada(), 3600);
    claims.iat = Utc::now().timestamp() - 7200;
    claims.exp = Utc::now().timestamp() - 10;
    let token = codec.encode(&claims).unwrap();

    assert_eq!(codec.decode_access(&token).unwrap_err(), TokenError::Expired);
}

#[test]
fn test_credential_expiring_now_is_rejected() {
    let codec = codec();
    let mut claims = Claims::new_access(&ada(), 3600);
    claims.exp = Utc::now().timestamp();
    let token = codec.encode(&claims).unwrap();

    assert_eq!(codec.decode_access(&token).unwrap_err(), TokenError::Expired);
}

#[test]
fn test_garbage_is_malformed() {
    let codec = codec();
    assert_eq!(codec.decode_access("not-a-token").unwrap_err(), TokenError::Malformed);
    assert_eq!(codec.decode_access("").unwrap_err(), TokenError::Malformed);
    assert_eq!(codec.decode_access("a.b.c").unwrap_err(), TokenError::Malformed);
}

#[test]
fn test_tampered_payload_is_rejected() {
    let codec = codec();
    let token = codec.issue_access(&bob()).unwrap();
    let forged = codec.issue_access(&ada()).unwrap();

    // bob's header and signature around ada's payload
    let parts: Vec<&str> = token.split('.').collect();
    let forged_parts: Vec<&str> = forged.split('.').collect();
    let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

    assert_eq!(codec.decode_access(&spliced).unwrap_err(), TokenError::InvalidSignature);
}

#[test]
fn test_missing_role_defaults_to_user() {
    let codec = codec();
    let mut claims = Claims::new_access(&ada(), 3600);
    claims.role = None;
    let token = codec.encode(&claims).unwrap();

    let principal = Principal::from_claims(codec.decode_access(&token).unwrap()).unwrap();
    assert_eq!(principal.role, Role::User);
}

#[test]
fn test_pair_reports_lifetimes() {
    let pair = codec().issue_pair(&ada()).unwrap();
    assert_eq!(pair.expires_in, 3600);
    assert_eq!(pair.refresh_expires_in, 604_800);
    assert_ne!(pair.access_token, pair.refresh_token);
}

#[test]
fn test_signed_email_ignores_expiry_but_not_signature() {
    let codec = codec();
    let mut claims = Claims::new_access(&ada(), 3600);
    claims.exp = Utc::now().timestamp() - 60;
    let expired = codec.encode(&claims).unwrap();
    assert_eq!(codec.signed_email(&expired).as_deref(), Some("ada@example.com"));

    let refresh = codec.issue_refresh(&bob()).unwrap();
    assert_eq!(codec.signed_email(&refresh).as_deref(), Some("bob@example.com"));

    let other = SigningSecrets::new(
        "another-access-secret-0123456789abcdef",
        "another-refresh-secret-0123456789abcdef",
    )
    .unwrap();
    let forged = TokenCodec::new(&other, TokenServiceConfig::default())
        .issue_access(&ada())
        .unwrap();
    assert_eq!(codec.signed_email(&forged), None);
    assert_eq!(codec.signed_email("garbage"), None);
}
