//! Global application error types and handlers.
//!
//! `ApiError` is the single error type handlers return. It owns the mapping
//! from the domain taxonomy (`auth::errors::AuthError`) and from
//! handler-level conditions (bad input, missing resource) to an HTTP status
//! and a JSON `{error, message}` body. Internal details never reach the
//! response; they are logged and replaced by a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::errors::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => {
                let status = err.status();
                if status.is_server_error() {
                    // Log the real cause, answer with a generic message.
                    tracing::error!(error = ?err, "request failed");
                    return error_body(status, err.code(), "Something went wrong!");
                }
                error_body(status, err.code(), &err.to_string())
            }
            ApiError::BadRequest(message) => {
                error_body(StatusCode::BAD_REQUEST, "bad_request", &message)
            }
            ApiError::NotFound(message) => {
                error_body(StatusCode::NOT_FOUND, "not_found", &message)
            }
        }
    }
}
