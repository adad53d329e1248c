use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::{RefreshRequest, RefreshResponse};
use crate::handlers::error::handle_domain_error;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh credential for a new access credential. The refresh
/// credential itself is not rotated.
///
/// # Request Body
///
/// ```json
/// { "refresh_token": "eyJ..." }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "access_token": "eyJ...", "token_type": "Bearer", "expires_in": 3600 }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: invalid, expired or revoked refresh credential, or an unknown identity
/// - 500 Internal Server Error: identity lookup failure
pub async fn refresh(
    state: web::Data<AppState>,
    request: web::Json<RefreshRequest>,
) -> HttpResponse {
    match state.authority.refresh(&request.refresh_token).await {
        Ok(refreshed) => HttpResponse::Ok().json(RefreshResponse::from(refreshed)),
        Err(error) => handle_domain_error(&error),
    }
}
