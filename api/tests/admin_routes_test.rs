//! Integration tests for the admin scope

mod common;

#[cfg(test)]
mod tests {
    use super::common::{ada, bearer, bob, context};
    use actix_web::{http::StatusCode, test};
    use serde_json::json;
    use wd_api::create_app;
    use wd_api::dto::RevokeIdentityResponse;
    use wd_core::{Role, WriteOutcome};
    use wd_shared::ErrorResponse;

    #[actix_web::test]
    async fn test_admin_scope_rejects_regular_user() {
        let ctx = context().await;
        let app = test::init_service(create_app(ctx.state.clone())).await;
        let access = ctx.authority.issue_access(&bob()).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/identities/user-ada/revoke")
            .insert_header(bearer(&access))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "FORBIDDEN");
    }

    #[actix_web::test]
    async fn test_stale_admin_claim_is_not_trusted() {
        let ctx = context().await;
        let app = test::init_service(create_app(ctx.state.clone())).await;
        // Directory says user, the credential still claims admin
        let mut promoted = bob();
        promoted.role = Role::Admin;
        let access = ctx.authority.issue_access(&promoted).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/identities/user-ada/revoke")
            .insert_header(bearer(&access))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_admin_scope_requires_credential() {
        let ctx = context().await;
        let app = test::init_service(create_app(ctx.state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/identities/user-bob/revoke")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_revoke_identity_rejects_outstanding_credentials() {
        let ctx = context().await;
        let app = test::init_service(create_app(ctx.state.clone())).await;
        let admin = ctx.authority.issue_access(&ada()).unwrap();
        let victim = ctx.authority.issue_pair(&bob()).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/identities/user-bob/revoke")
            .insert_header(bearer(&admin))
            .set_json(json!({ "reason": "Account compromised" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: RevokeIdentityResponse = test::read_body_json(resp).await;
        assert_eq!(body.subject_id, "user-bob");
        assert_eq!(body.outcome, WriteOutcome::Durable);

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(bearer(&victim.access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": victim.refresh_token }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        assert!(ctx.authority.is_identity_revoked("user-bob").await);
        assert!(!ctx.authority.is_identity_revoked("user-ada").await);
    }

    #[actix_web::test]
    async fn test_revoke_identity_reports_memory_only_outcome() {
        let ctx = context().await;
        let app = test::init_service(create_app(ctx.state.clone())).await;
        let admin = ctx.authority.issue_access(&ada()).unwrap();
        ctx.durable.set_fail_writes(true);

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/identities/user-bob/revoke")
            .insert_header(bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: RevokeIdentityResponse = test::read_body_json(resp).await;
        assert_eq!(body.outcome, WriteOutcome::MemoryOnly);
        assert_eq!(ctx.authority.revocation_store().consecutive_write_failures(), 1);
    }
}
