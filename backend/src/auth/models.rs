//! Data structures for authentication-related entities.
//!
//! This module defines the wire-facing request and response types for
//! registration, verification and login, the public `Account` view (which
//! never carries the password hash), and the request-scoped `Principal`
//! produced by the bearer-token middleware.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::AccountRecord;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Public view of an account. The password hash stays in the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub verified: bool,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            phone_number: record.phone_number,
            verified: record.verified,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Query parameters of `GET /users/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub token: String,
}

/// Authenticated identity attached to a request by the bearer middleware.
///
/// Only produced for accounts that are usable for authentication, which for
/// this service means verified: an unverified account never yields a
/// principal.
#[derive(Debug, Clone)]
pub struct Principal {
    pub account_id: Uuid,
    pub email: String,
}
