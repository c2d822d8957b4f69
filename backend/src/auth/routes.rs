//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle registration, email verification and login. They are
//! nested under `/users` by the main router, alongside the administrative
//! user endpoints from `api::user`.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{login, register, verify_email};
use super::service::AuthService;

pub fn router() -> Router<AuthService> {
    Router::new()
        .route("/register", post(register))
        .route("/verify", get(verify_email))
        .route("/login", post(login))
}
