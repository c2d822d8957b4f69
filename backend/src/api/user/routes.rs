//! Defines the HTTP routes for the administrative user endpoints.
//!
//! These routes are merged with the authentication routes under `/users`.
//! The static `/all` and `/email/:email` paths take precedence over the
//! `/:id` capture in the router's matcher.

use axum::routing::get;
use axum::Router;

use crate::auth::service::AuthService;

use super::handlers::{delete_all, delete_by_id, get_by_email, get_by_id, list_all};

pub fn router() -> Router<AuthService> {
    Router::new()
        .route("/all", get(list_all).delete(delete_all))
        .route("/email/:email", get(get_by_email))
        .route("/:id", get(get_by_id).delete(delete_by_id))
}
