use actix_web::HttpResponse;

use crate::dto::MeResponse;
use crate::middleware::auth::Authenticated;

/// Handler for GET /api/v1/auth/me
pub async fn me(principal: Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse::from(&principal.0))
}
