//! Module for account and verification-token storage contracts.
//!
//! This module defines the store traits the rest of the backend depends on,
//! together with the error type store implementations report. Both traits are
//! written so that the operations the business logic must treat as atomic
//! (unique-email insert, conditional token take) are single calls; an
//! implementation backed by a real database maps them onto a unique
//! constraint and a conditional delete respectively.

pub mod memory;
pub mod models;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use self::models::{AccountRecord, VerificationTokenRecord};

/// Failures reported by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate key")]
    Duplicate,
    /// The store could not be reached or the operation did not complete.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a conditional verification-token take.
#[derive(Debug)]
pub enum TakeOutcome {
    /// The token existed and was unexpired; the row has been deleted and is
    /// returned to the single caller that won it.
    Taken(VerificationTokenRecord),
    /// The token exists but is past its expiry. The row is left in place.
    Expired,
    /// No row matches the token.
    Missing,
}

/// Durable table of accounts, keyed by id, unique on email.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. The uniqueness check on email and the write must
    /// be one atomic operation; a conflict is reported as
    /// [`StoreError::Duplicate`].
    async fn insert(&self, account: AccountRecord) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Flip `verified` to true. Returns false when no such account exists.
    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError>;

    /// Returns false when no such account exists.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns the number of deleted accounts.
    async fn delete_all(&self) -> Result<u64, StoreError>;
}

/// Durable table of verification tokens, keyed by the opaque token string.
#[async_trait]
pub trait VerificationTokenStore: Send + Sync {
    async fn insert(&self, token: VerificationTokenRecord) -> Result<(), StoreError>;

    /// Atomically look up and consume `token`. At most one concurrent caller
    /// may observe [`TakeOutcome::Taken`] for a given token string; everyone
    /// else sees [`TakeOutcome::Missing`] once the row is gone. Expired rows
    /// are reported but not deleted; housekeeping is a separate concern.
    async fn take(&self, token: &str, now: DateTime<Utc>) -> Result<TakeOutcome, StoreError>;
}
