//! Custom error types specific to authentication failures.
//!
//! This is the caller-facing taxonomy for the account lifecycle: every
//! `AuthService` operation returns one of these instead of panicking or
//! hiding the failure. The HTTP layer (`crate::errors`) owns the mapping to
//! status codes; the messages here are safe to show to users.

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already exists")]
    AccountAlreadyExists,
    #[error("User not found")]
    AccountNotFound,
    #[error("Account not activated yet. Please check your inbox for the verification link.")]
    AccountNotVerified,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid verification token.")]
    InvalidToken,
    #[error("Token has expired.")]
    TokenExpired,
    #[error("Unable to send verification link. Please check your email address.")]
    NotificationFailure,
    #[error("Service temporarily unavailable")]
    StoreUnavailable(#[source] crate::database::StoreError),
    /// Unexpected failure; details go to the log, not the response.
    #[error("Something went wrong!")]
    Internal(String),
}

impl AuthError {
    /// Short machine-readable code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AccountAlreadyExists => "account_already_exists",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::AccountNotVerified => "account_not_verified",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::NotificationFailure => "notification_failure",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::AccountAlreadyExists
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::NotificationFailure => StatusCode::BAD_REQUEST,
            AuthError::AccountNotFound
            | AuthError::AccountNotVerified
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::database::StoreError> for AuthError {
    fn from(err: crate::database::StoreError) -> Self {
        match err {
            // Callers that need Duplicate as a domain error map it themselves;
            // reaching here means an unexpected constraint violation.
            crate::database::StoreError::Duplicate => {
                AuthError::Internal("unexpected duplicate key".to_string())
            }
            other => AuthError::StoreUnavailable(other),
        }
    }
}
