use actix_web::{web, HttpResponse};
use tracing::info;

use crate::app::AppState;
use crate::dto::{RevokeIdentityRequest, RevokeIdentityResponse};
use crate::middleware::auth::Authenticated;

/// Handler for POST /api/v1/admin/identities/{id}/revoke
///
/// Rejects every credential issued to the identity up to now. Credentials
/// minted by a later sign-in are accepted again.
///
/// # Request Body (optional)
///
/// ```json
/// { "reason": "Account compromised" }
/// ```
pub async fn revoke_identity(
    state: web::Data<AppState>,
    admin: Authenticated,
    path: web::Path<String>,
    body: Option<web::Json<RevokeIdentityRequest>>,
) -> HttpResponse {
    let subject_id = path.into_inner();
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    let outcome = state
        .authority
        .revoke_all_for_identity(&subject_id, request.reason())
        .await;

    info!(
        admin = %admin.subject_id,
        subject = %subject_id,
        durable = outcome.is_durable(),
        "Identity revoked by administrator"
    );

    HttpResponse::Ok().json(RevokeIdentityResponse {
        subject_id,
        outcome,
    })
}
