//! Handler functions for the administrative user endpoints.
//!
//! These functions serve account lookups and deletions over the same
//! `AuthService` the authentication flow uses; none of them can bypass the
//! lifecycle invariants, since all writes go through the store contracts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::auth::service::AuthService;
use crate::errors::ApiError;

/// Parsed by hand so a malformed id gets the same JSON error body as every
/// other failure instead of axum's plain-text path rejection.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid user id: {raw}")))
}

/// GET /users/:id
pub async fn get_by_id(
    State(auth): State<AuthService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let account = auth
        .account(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found with id: {id}")))?;
    Ok(Json(account))
}

/// GET /users/email/:email
pub async fn get_by_email(
    State(auth): State<AuthService>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let account = auth
        .account_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found with email: {email}")))?;
    Ok(Json(account))
}

/// GET /users/all
pub async fn list_all(State(auth): State<AuthService>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(auth.accounts().await?))
}

/// DELETE /users/:id
pub async fn delete_by_id(
    State(auth): State<AuthService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    auth.delete_account(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/all
pub async fn delete_all(State(auth): State<AuthService>) -> Result<impl IntoResponse, ApiError> {
    let deleted = auth.delete_all_accounts().await?;
    tracing::info!(deleted, "deleted all accounts");
    Ok(StatusCode::NO_CONTENT)
}
