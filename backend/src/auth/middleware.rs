//! Middleware for bearer-token authentication.
//!
//! One stage of the request pipeline: when the request carries a valid
//! `Authorization: Bearer` token whose subject resolves to an existing,
//! verified account, a request-scoped [`Principal`] is inserted as an
//! extension for downstream handlers. The stage never rejects on its own;
//! the `/users` endpoints of this service are public, and a handler that
//! needs an identity decides what to do when the extension is absent.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

use super::service::AuthService;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn authenticate<B>(
    State(auth): State<AuthService>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        if let Some(principal) = auth.principal(token).await {
            tracing::debug!(email = %principal.email, "request authenticated");
            request.extensions_mut().insert(principal);
        }
    }

    next.run(request).await
}
