//! Application state and factory
//!
//! This module holds the shared application state and provides the factory
//! for creating the Actix-web application, so `main` and the integration
//! tests build exactly the same routing table.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;
use wd_core::{CredentialAuthority, Role};
use wd_shared::{error_codes, ErrorResponse};

use crate::handlers::error::json_error_handler;
use crate::middleware::auth::JwtAuth;
use crate::routes::{admin, auth, health};

/// State shared by every worker
pub struct AppState {
    pub authority: Arc<CredentialAuthority>,
}

impl AppState {
    pub fn new(authority: Arc<CredentialAuthority>) -> Self {
        Self { authority }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/refresh", web::post().to(auth::refresh::refresh))
                        .service(
                            web::resource("/signout")
                                .route(web::post().to(auth::signout::sign_out))
                                .wrap(JwtAuth::new()),
                        )
                        .service(
                            web::resource("/me")
                                .route(web::get().to(auth::me::me))
                                .wrap(JwtAuth::new()),
                        ),
                )
                .service(
                    web::scope("/admin")
                        .route(
                            "/identities/{id}/revoke",
                            web::post().to(admin::revoke_identity::revoke_identity),
                        )
                        .wrap(JwtAuth::require(Role::Admin)),
                ),
        )
        .default_service(web::route().to(|| async {
            HttpResponse::NotFound().json(ErrorResponse::new(
                error_codes::NOT_FOUND,
                "The requested resource was not found",
            ))
        }))
}
