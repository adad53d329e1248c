//! HTTP collaborator surface for the Warden credential service
//!
//! The handlers here are thin: every credential decision is made by
//! [`wd_core::CredentialAuthority`].

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
