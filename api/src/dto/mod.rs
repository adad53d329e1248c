pub mod admin;
pub mod auth;

pub use admin::{RevokeIdentityRequest, RevokeIdentityResponse};
pub use auth::{MeResponse, RefreshRequest, RefreshResponse, SignOutRequest, SignOutResponse};
