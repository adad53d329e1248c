//! Mapping of domain errors onto HTTP responses
//!
//! Credential failures all leave as the same 401 body so a caller cannot
//! tell an expired credential from a revoked or forged one.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use tracing::{error, warn};
use wd_core::DomainError;
use wd_shared::{error_codes, ErrorResponse};

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Unauthorized | DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = status_for(error);
    let body = match status {
        StatusCode::UNAUTHORIZED => ErrorResponse::unauthorized(),
        StatusCode::FORBIDDEN => ErrorResponse::forbidden(),
        _ => {
            error!(error = %error, "Request failed with an internal error");
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
        }
    };

    HttpResponse::build(status).json(body)
}

/// Malformed JSON bodies become a 400 with the standard error body
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "Rejected request body");
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::BAD_REQUEST,
        "Request body is not valid JSON for this endpoint",
    ));
    InternalError::from_response(err, response).into()
}
