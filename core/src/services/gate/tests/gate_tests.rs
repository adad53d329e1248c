//! Unit tests for the verification gate

use chrono::Utc;
use std::sync::Arc;

use crate::domain::entities::identity::Role;
use crate::domain::entities::token::Claims;
use crate::errors::DomainError;
use crate::services::fixtures::{ada, bob, gate_fixture, GateFixture};
use crate::services::gate::VerificationGate;
use crate::services::revocation::WriteOutcome;

fn gate(fixture: &GateFixture) -> VerificationGate {
    VerificationGate::new(
        fixture.tokens.clone(),
        fixture.roles.clone(),
        Arc::new(fixture.identities.clone()),
    )
}

#[tokio::test]
async fn test_authenticate_valid_access_credential() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&ada()).unwrap();

    let principal = gate.authenticate(&token).await.unwrap();
    assert_eq!(principal.subject_id, "user-ada");
    assert_eq!(principal.email, "ada@example.com");
    assert_eq!(principal.role, Role::Admin);
}

#[tokio::test]
async fn test_every_failure_is_unauthorized() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let refresh = fixture.tokens.issue_refresh(&ada()).unwrap();

    let mut expired = Claims::new_access(&ada(), 3600);
    expired.exp = Utc::now().timestamp() - 1;
    let expired = fixture.tokens.codec().encode(&expired).unwrap();

    for credential in [refresh.as_str(), expired.as_str(), "garbage", ""] {
        assert!(matches!(
            gate.authenticate(credential).await,
            Err(DomainError::Unauthorized)
        ));
    }
}

#[tokio::test]
async fn test_revoked_credential_invalidates_cached_role() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&ada()).unwrap();
    let principal = gate.authenticate(&token).await.unwrap();
    fixture.roles.set("ada@example.com", Role::Admin).await;

    fixture
        .tokens
        .store()
        .revoke_token(&principal.jti, principal.expires_at, "test")
        .await;

    assert!(matches!(gate.authenticate(&token).await, Err(DomainError::Unauthorized)));
    assert_eq!(fixture.roles.get("ada@example.com").await, None);
}

#[tokio::test]
async fn test_rejected_but_signed_credential_invalidates_cached_role() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);

    let mut expired = Claims::new_access(&ada(), 3600);
    expired.exp = Utc::now().timestamp() - 1;
    let expired = fixture.tokens.codec().encode(&expired).unwrap();
    fixture.roles.set("ada@example.com", Role::Admin).await;
    assert!(gate.authenticate(&expired).await.is_err());
    assert_eq!(fixture.roles.get("ada@example.com").await, None);

    let refresh = fixture.tokens.issue_refresh(&bob()).unwrap();
    fixture.roles.set("bob@example.com", Role::User).await;
    assert!(gate.authenticate(&refresh).await.is_err());
    assert_eq!(fixture.roles.get("bob@example.com").await, None);
}

#[tokio::test]
async fn test_unsigned_credential_leaves_cached_role() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    fixture.roles.set("ada@example.com", Role::Admin).await;

    let token = fixture.tokens.issue_access(&ada()).unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[2] = "c2lnbmF0dXJl";
    let tampered = parts.join(".");

    assert!(gate.authenticate(&tampered).await.is_err());
    assert_eq!(fixture.roles.get("ada@example.com").await, Some(Role::Admin));
}

#[tokio::test]
async fn test_authorize_reads_through_to_identity_directory() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&ada()).unwrap();

    assert_eq!(gate.authorize(&token, Role::Admin).await.unwrap().role, Role::Admin);
    assert_eq!(gate.authorize(&token, Role::Admin).await.unwrap().role, Role::Admin);

    assert_eq!(fixture.identities.lookup_count(), 1);
    assert_eq!(fixture.roles.get("ada@example.com").await, Some(Role::Admin));
}

#[tokio::test]
async fn test_demotion_takes_effect_after_invalidation() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&ada()).unwrap();
    assert!(gate.authorize(&token, Role::Admin).await.is_ok());

    fixture.identities.set_role("user-ada", Role::User).await;
    fixture.roles.invalidate("ada@example.com").await;

    // the credential itself still says admin
    assert!(matches!(
        gate.authorize(&token, Role::Admin).await,
        Err(DomainError::Forbidden)
    ));
    assert_eq!(gate.authorize(&token, Role::User).await.unwrap().role, Role::User);
}

#[tokio::test]
async fn test_forbidden_drops_cached_role() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&bob()).unwrap();
    fixture.roles.set("bob@example.com", Role::User).await;

    assert!(matches!(
        gate.authorize(&token, Role::Admin).await,
        Err(DomainError::Forbidden)
    ));
    assert_eq!(fixture.roles.get("bob@example.com").await, None);
}

#[tokio::test]
async fn test_role_lookup_failure_grants_only_user() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&ada()).unwrap();
    fixture.identities.set_fail(true);

    assert!(matches!(
        gate.authorize(&token, Role::Admin).await,
        Err(DomainError::Forbidden)
    ));
    assert!(gate.authorize(&token, Role::User).await.is_ok());
}

#[tokio::test]
async fn test_deleted_identity_is_unauthorized() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let token = fixture.tokens.issue_access(&bob()).unwrap();
    fixture.identities.remove("user-bob").await;

    assert!(matches!(
        gate.authorize(&token, Role::User).await,
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_refresh_issues_access_with_current_role() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let refresh = fixture.tokens.issue_refresh(&ada()).unwrap();
    fixture.identities.set_role("user-ada", Role::User).await;

    let refreshed = gate.refresh(&refresh).await.unwrap();
    assert_eq!(refreshed.expires_in, 3600);
    assert_eq!(refreshed.identity.role, Role::User);

    let principal = gate.authenticate(&refreshed.access_token).await.unwrap();
    assert_eq!(principal.role, Role::User);
    assert_eq!(fixture.roles.get("ada@example.com").await, Some(Role::User));
}

#[tokio::test]
async fn test_refresh_rejects_access_credential_and_unknown_identity() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let access = fixture.tokens.issue_access(&ada()).unwrap();
    assert!(matches!(gate.refresh(&access).await, Err(DomainError::Unauthorized)));

    let refresh = fixture.tokens.issue_refresh(&bob()).unwrap();
    fixture.identities.remove("user-bob").await;
    assert!(matches!(gate.refresh(&refresh).await, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn test_refresh_lookup_failure_is_internal() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let refresh = fixture.tokens.issue_refresh(&ada()).unwrap();
    fixture.identities.set_fail(true);

    assert!(matches!(gate.refresh(&refresh).await, Err(DomainError::Internal { .. })));
}

#[tokio::test]
async fn test_sign_out_revokes_both_credentials() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let pair = fixture.tokens.issue_pair(&ada()).unwrap();
    let principal = gate.authenticate(&pair.access_token).await.unwrap();
    fixture.roles.set("ada@example.com", Role::Admin).await;

    let outcome = gate.sign_out(&principal, Some(&pair.refresh_token)).await;

    assert_eq!(outcome.access, WriteOutcome::Durable);
    assert_eq!(outcome.refresh, Some(WriteOutcome::Durable));
    assert!(outcome.is_durable());
    assert!(gate.authenticate(&pair.access_token).await.is_err());
    assert!(gate.refresh(&pair.refresh_token).await.is_err());
    assert_eq!(fixture.roles.get("ada@example.com").await, None);
    assert_eq!(fixture.durable.entry_count().await, 2);
}

#[tokio::test]
async fn test_sign_out_ignores_foreign_refresh_credential() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let access = fixture.tokens.issue_access(&ada()).unwrap();
    let bobs_refresh = fixture.tokens.issue_refresh(&bob()).unwrap();
    let principal = gate.authenticate(&access).await.unwrap();

    let outcome = gate.sign_out(&principal, Some(&bobs_refresh)).await;

    assert!(outcome.refresh.is_none());
    assert!(gate.refresh(&bobs_refresh).await.is_ok());
}

#[tokio::test]
async fn test_sign_out_reports_memory_only_writes() {
    let fixture = gate_fixture().await;
    let gate = gate(&fixture);
    let access = fixture.tokens.issue_access(&ada()).unwrap();
    let principal = gate.authenticate(&access).await.unwrap();
    fixture.durable.set_fail_writes(true);

    let outcome = gate.sign_out(&principal, None).await;

    assert_eq!(outcome.access, WriteOutcome::MemoryOnly);
    assert!(!outcome.is_durable());
    assert!(gate.authenticate(&access).await.is_err());
}
