//! Rust structs that represent stored table rows.
//!
//! These models define the structure of data as it is kept in the stores.
//! They carry the password hash and are never serialized onto the wire; the
//! API-facing views live in `auth::models`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A row in the accounts table.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: Uuid,
    /// Globally unique, stored trimmed and lowercased.
    pub email: String,
    pub name: String,
    pub phone_number: String,
    /// bcrypt output; the plaintext password is never stored.
    pub password_hash: String,
    /// Starts false, flipped to true exactly once by token consumption.
    pub verified: bool,
}

/// A row in the verification-tokens table.
#[derive(Debug, Clone)]
pub struct VerificationTokenRecord {
    pub id: Uuid,
    /// Random, unguessable token string, unique across all tokens.
    pub token: String,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
