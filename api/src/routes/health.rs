use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::app::AppState;

/// Handler for GET /health
///
/// Reports `degraded` while the durable revocation tier is unreachable or
/// the write-path alarm is raised. The process stays up either way.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let health = state.authority.health().await;
    let degraded = !health.revocation.durable_reachable || health.revocation.write_alarm;

    HttpResponse::Ok().json(json!({
        "status": if degraded { "degraded" } else { "healthy" },
        "service": "warden",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "authority": health,
    }))
}
