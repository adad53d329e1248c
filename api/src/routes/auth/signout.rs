use actix_web::{web, HttpResponse};
use tracing::warn;

use crate::app::AppState;
use crate::dto::{SignOutRequest, SignOutResponse};
use crate::middleware::auth::Authenticated;

/// Handler for POST /api/v1/auth/signout
///
/// Revokes the presented access credential and, when the body carries one
/// for the same identity, the refresh credential. Always answers 200 once
/// the caller is authenticated; a revocation that only reached the memory
/// tier is reported as `memory_only`.
pub async fn sign_out(
    state: web::Data<AppState>,
    principal: Authenticated,
    body: Option<web::Json<SignOutRequest>>,
) -> HttpResponse {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let outcome = state
        .authority
        .sign_out(&principal, request.refresh_token.as_deref())
        .await;

    if !outcome.is_durable() {
        warn!(subject = %principal.subject_id, "Sign-out revocation not persisted durably");
    }

    HttpResponse::Ok().json(SignOutResponse::from(outcome))
}
