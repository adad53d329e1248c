//! Bearer credential middleware for protecting API endpoints.
//!
//! This middleware extracts the access credential from the Authorization
//! header, runs it through the credential authority and injects the
//! resulting [`Principal`] into request extensions.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::error;
use wd_core::{DomainError, Principal, Role};

use crate::app::AppState;
use crate::handlers::error::handle_domain_error;

/// Authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth {
    required: Option<Role>,
}

impl JwtAuth {
    /// Any valid access credential passes
    pub fn new() -> Self {
        Self { required: None }
    }

    /// The caller's current role must satisfy `role`
    pub fn require(role: Role) -> Self {
        Self {
            required: Some(role),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

/// Authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    required: Option<Role>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                error!("Authentication middleware mounted without application state");
                let response = handle_domain_error(&DomainError::Internal {
                    message: "authentication is not configured".to_string(),
                });
                return Ok(req.into_response(response).map_into_right_body());
            };

            let Some(token) = extract_bearer_token(&req) else {
                let response = handle_domain_error(&DomainError::Unauthorized);
                return Ok(req.into_response(response).map_into_right_body());
            };

            let verified = match required {
                Some(role) => state.authority.authorize(&token, role).await,
                None => state.authority.authenticate(&token).await,
            };

            match verified {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = handle_domain_error(&err);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Extracts the bearer credential from the Authorization header
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Newtype extractor for the verified caller.
///
/// Handlers behind [`JwtAuth`] take this to receive the [`Principal`].
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl std::ops::Deref for Authenticated {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result: Result<Self, Self::Error> = req
            .extensions()
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| {
                actix_web::error::InternalError::from_response(
                    "authentication required",
                    handle_domain_error(&DomainError::Unauthorized),
                )
                .into()
            });

        ready(result)
    }
}
