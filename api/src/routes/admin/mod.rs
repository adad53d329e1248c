//! Administrator route handlers, mounted behind `JwtAuth::require(Role::Admin)`

pub mod revoke_identity;
