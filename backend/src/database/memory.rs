//! In-process store implementation.
//!
//! Both stores keep their rows in a `HashMap` behind a `tokio::sync::Mutex`,
//! so the check-then-insert on email and the lookup-then-delete on a token
//! each run under a single lock acquisition and are atomic with respect to
//! concurrent requests. This is the implementation the binary ships with;
//! a database-backed one only has to satisfy the same traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::{AccountRecord, VerificationTokenRecord};
use super::{AccountStore, StoreError, TakeOutcome, VerificationTokenStore};

#[derive(Default)]
pub struct MemoryAccountStore {
    rows: Mutex<HashMap<Uuid, AccountRecord>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: AccountRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;
        if rows.values().any(|r| r.email == account.email) {
            return Err(StoreError::Duplicate);
        }
        rows.insert(account.id, account);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.values().find(|r| r.email == email).cloned())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(&id) {
            Some(row) => {
                row.verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.lock().await.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().await;
        let count = rows.len() as u64;
        rows.clear();
        Ok(count)
    }
}

#[derive(Default)]
pub struct MemoryVerificationTokenStore {
    rows: Mutex<HashMap<String, VerificationTokenRecord>>,
}

impl MemoryVerificationTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationTokenStore for MemoryVerificationTokenStore {
    async fn insert(&self, token: VerificationTokenRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&token.token) {
            return Err(StoreError::Duplicate);
        }
        rows.insert(token.token.clone(), token);
        Ok(())
    }

    async fn take(&self, token: &str, now: DateTime<Utc>) -> Result<TakeOutcome, StoreError> {
        let mut rows = self.rows.lock().await;
        let expired = match rows.get(token) {
            None => return Ok(TakeOutcome::Missing),
            Some(row) => now > row.expires_at,
        };
        if expired {
            // Expired rows stay behind for housekeeping.
            return Ok(TakeOutcome::Expired);
        }
        let row = rows.remove(token).ok_or_else(|| {
            StoreError::Unavailable("token row vanished under lock".to_string())
        })?;
        Ok(TakeOutcome::Taken(row))
    }
}
