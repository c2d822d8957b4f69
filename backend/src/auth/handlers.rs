//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, email
//! verification and login, validate the input, and delegate the business
//! logic to `auth::service`. All failure mapping to status codes lives in
//! `crate::errors`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::errors::ApiError;

use super::models::{LoginRequest, LoginResponse, RegisterRequest, VerifyParams};
use super::service::AuthService;

/// POST /users/register
pub async fn register(
    State(auth): State<AuthService>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email cannot be blank"));
    }
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password cannot be blank"));
    }

    let account = auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /users/verify?token=...
pub async fn verify_email(
    State(auth): State<AuthService>,
    Query(params): Query<VerifyParams>,
) -> Result<impl IntoResponse, ApiError> {
    auth.verify(&params.token).await?;
    Ok("Email successfully verified!")
}

/// POST /users/login
pub async fn login(
    State(auth): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = auth.login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse { token }))
}
