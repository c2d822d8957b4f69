//! Core business logic for the authentication system.
//!
//! `AuthService` owns the account lifecycle: registration with email
//! verification, token consumption, and credential login with bearer-token
//! issuance. It orchestrates the stores, the password hasher, the token
//! issuer and the mail notifier, and is the only place the business
//! invariants live; handlers stay thin.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::time::timeout;
use uuid::Uuid;

use crate::database::models::{AccountRecord, VerificationTokenRecord};
use crate::database::{AccountStore, StoreError, TakeOutcome, VerificationTokenStore};
use crate::mailer::Notifier;

use super::errors::AuthError;
use super::models::{Account, Principal, RegisterRequest};
use super::password::PasswordHasher;
use super::tokens::TokenIssuer;

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";

/// Tunables the service needs beyond its collaborators.
pub struct AuthSettings {
    /// Base URL embedded in verification links, without a trailing slash.
    pub public_base_url: String,
    /// Verification tokens live this long from issuance.
    pub verification_ttl: Duration,
    /// Upper bound on one outbound mail attempt; exceeding it is reported
    /// the same way as a delivery failure.
    pub mail_timeout: StdDuration,
}

/// Cheaply cloneable handle; all state lives behind one `Arc`.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<Inner>,
}

struct Inner {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<dyn VerificationTokenStore>,
    notifier: Arc<dyn Notifier>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    settings: AuthSettings,
}

/// Emails are compared as stored: trimmed and lowercased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn VerificationTokenStore>,
        notifier: Arc<dyn Notifier>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        settings: AuthSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                accounts,
                tokens,
                notifier,
                hasher,
                issuer,
                settings,
            }),
        }
    }

    /// Register a new account and email it a verification link.
    ///
    /// Uniqueness on email is enforced by the store's atomic insert, never by
    /// a separate existence check. If mail delivery fails the account and
    /// token stay persisted and the caller is told via
    /// [`AuthError::NotificationFailure`], so delivery can be retried out of
    /// band.
    pub async fn register(&self, request: RegisterRequest) -> Result<Account, AuthError> {
        let email = normalize_email(&request.email);

        // bcrypt is CPU-bound; keep it off the request-handling threads.
        let hasher = self.inner.hasher.clone();
        let plaintext = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let record = AccountRecord {
            id: Uuid::new_v4(),
            email,
            name: request.name,
            phone_number: request.phone_number,
            password_hash,
            verified: false,
        };

        match self.inner.accounts.insert(record.clone()).await {
            Ok(()) => {}
            Err(StoreError::Duplicate) => return Err(AuthError::AccountAlreadyExists),
            Err(other) => return Err(AuthError::StoreUnavailable(other)),
        }
        tracing::info!(account_id = %record.id, email = %record.email, "account registered");

        self.send_verification(&record).await?;

        Ok(Account::from(record))
    }

    async fn send_verification(&self, account: &AccountRecord) -> Result<(), AuthError> {
        let token = Uuid::new_v4().to_string();
        let row = VerificationTokenRecord {
            id: Uuid::new_v4(),
            token: token.clone(),
            account_id: account.id,
            expires_at: Utc::now() + self.inner.settings.verification_ttl,
        };
        self.inner.tokens.insert(row).await?;

        let link = format!(
            "{}/users/verify?token={}",
            self.inner.settings.public_base_url, token
        );
        let body = format!("Click the link to verify your email: {link}");

        tracing::info!(email = %account.email, "sending verification email");
        let send = self
            .inner
            .notifier
            .send(&account.email, VERIFICATION_SUBJECT, &body);
        match timeout(self.inner.settings.mail_timeout, send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                tracing::error!(email = %account.email, error = %err, "failed to send verification email");
                Err(AuthError::NotificationFailure)
            }
            Err(_) => {
                tracing::error!(email = %account.email, "verification email timed out");
                Err(AuthError::NotificationFailure)
            }
        }
    }

    /// Consume a verification token and flip the owning account to verified.
    ///
    /// The lookup and the delete are one atomic store operation, so under
    /// concurrent calls with the same token exactly one caller succeeds and
    /// the rest observe `InvalidToken`. Expired tokens are reported but left
    /// in the store.
    pub async fn verify(&self, token: &str) -> Result<(), AuthError> {
        match self.inner.tokens.take(token, Utc::now()).await? {
            TakeOutcome::Missing => Err(AuthError::InvalidToken),
            TakeOutcome::Expired => Err(AuthError::TokenExpired),
            TakeOutcome::Taken(row) => {
                if self.inner.accounts.mark_verified(row.account_id).await? {
                    tracing::info!(account_id = %row.account_id, "account verified");
                    Ok(())
                } else {
                    // The account was deleted while its token was live; the
                    // token no longer refers to anything.
                    Err(AuthError::InvalidToken)
                }
            }
        }
    }

    /// Authenticate credentials and issue a bearer token.
    ///
    /// The verified check runs before the password comparison, so an
    /// unverified account never learns whether its password was correct.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let account = self
            .inner
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !account.verified {
            return Err(AuthError::AccountNotVerified);
        }

        let hasher = self.inner.hasher.clone();
        let plaintext = password.to_string();
        let hash = account.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        self.inner
            .issuer
            .issue(&account.email)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Resolve a bearer token into a request principal.
    ///
    /// Returns `None` unless the token is valid and its subject is an
    /// existing, verified account; an unverified account is not a usable
    /// principal.
    pub async fn principal(&self, bearer: &str) -> Option<Principal> {
        let subject = self.inner.issuer.verify(bearer).ok()?;
        let account = match self.inner.accounts.find_by_email(&subject).await {
            Ok(found) => found?,
            Err(err) => {
                tracing::warn!(error = %err, "principal lookup failed");
                return None;
            }
        };

        account.verified.then(|| Principal {
            account_id: account.id,
            email: account.email,
        })
    }

    pub async fn account(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        Ok(self.inner.accounts.find_by_id(id).await?.map(Account::from))
    }

    pub async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let email = normalize_email(email);
        Ok(self
            .inner
            .accounts
            .find_by_email(&email)
            .await?
            .map(Account::from))
    }

    pub async fn accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self
            .inner
            .accounts
            .list()
            .await?
            .into_iter()
            .map(Account::from)
            .collect())
    }

    pub async fn delete_account(&self, id: Uuid) -> Result<bool, AuthError> {
        Ok(self.inner.accounts.delete(id).await?)
    }

    pub async fn delete_all_accounts(&self) -> Result<u64, AuthError> {
        Ok(self.inner.accounts.delete_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::database::memory::{MemoryAccountStore, MemoryVerificationTokenStore};
    use crate::mailer::MailError;

    use super::*;

    struct MockNotifier {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl MockNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        /// Pull the verification token out of the most recent email body.
        async fn last_token(&self) -> String {
            let sent = self.sent.lock().await;
            let (_, _, body) = sent.last().expect("no email was sent");
            let (_, token) = body.rsplit_once("token=").expect("no token in body");
            token.to_string()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Address(
                    "no-at-sign".parse::<lettre::Address>().unwrap_err(),
                ));
            }
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        service: AuthService,
        accounts: Arc<MemoryAccountStore>,
        tokens: Arc<MemoryVerificationTokenStore>,
        notifier: Arc<MockNotifier>,
    }

    fn fixture_with(notifier: Arc<MockNotifier>) -> Fixture {
        let accounts = Arc::new(MemoryAccountStore::new());
        let tokens = Arc::new(MemoryVerificationTokenStore::new());
        let service = AuthService::new(
            accounts.clone(),
            tokens.clone(),
            notifier.clone(),
            PasswordHasher::new(4),
            TokenIssuer::new("test-secret", 3600),
            AuthSettings {
                public_base_url: "http://localhost:3000".to_string(),
                verification_ttl: Duration::hours(24),
                mail_timeout: StdDuration::from_secs(1),
            },
        );

        Fixture {
            service,
            accounts,
            tokens,
            notifier,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockNotifier::new())
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            name: "Alice".to_string(),
            password: "hunter2!".to_string(),
            phone_number: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_an_unverified_account() {
        let fx = fixture();
        let account = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        assert_eq!(account.email, "alice@example.com");
        assert!(!account.verified);

        let (to, subject, body) = fx.notifier.sent.lock().await.last().cloned().unwrap();
        assert_eq!(to, "alice@example.com");
        assert_eq!(subject, VERIFICATION_SUBJECT);
        assert!(body.starts_with("Click the link to verify your email: "));
        assert!(body.contains("/users/verify?token="));
    }

    #[tokio::test]
    async fn register_normalizes_the_email() {
        let fx = fixture();
        let account = fx
            .service
            .register(register_request("  Alice@Example.COM "))
            .await
            .unwrap();

        assert_eq!(account.email, "alice@example.com");
    }

    #[tokio::test]
    async fn registering_the_same_email_twice_fails() {
        let fx = fixture();
        fx.service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        let err = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountAlreadyExists));
        assert_eq!(fx.accounts.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mail_failure_is_reported_but_the_account_is_kept() {
        let fx = fixture_with(MockNotifier::failing());
        let err = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::NotificationFailure));
        // Account and token are already persisted; delivery can be retried
        // out of band.
        assert_eq!(fx.accounts.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mail_timeout_is_reported_like_a_delivery_failure() {
        // Records the message, then never finishes delivering it.
        struct StalledNotifier {
            body: Mutex<Option<String>>,
        }

        #[async_trait]
        impl Notifier for StalledNotifier {
            async fn send(&self, _to: &str, _subject: &str, body: &str) -> Result<(), MailError> {
                *self.body.lock().await = Some(body.to_string());
                tokio::time::sleep(StdDuration::from_millis(500)).await;
                Ok(())
            }
        }

        let notifier = Arc::new(StalledNotifier {
            body: Mutex::new(None),
        });
        let accounts = Arc::new(MemoryAccountStore::new());
        let tokens = Arc::new(MemoryVerificationTokenStore::new());
        let service = AuthService::new(
            accounts.clone(),
            tokens.clone(),
            notifier.clone(),
            PasswordHasher::new(4),
            TokenIssuer::new("test-secret", 3600),
            AuthSettings {
                public_base_url: "http://localhost:3000".to_string(),
                verification_ttl: Duration::hours(24),
                mail_timeout: StdDuration::from_millis(50),
            },
        );

        let err = service
            .register(register_request("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotificationFailure));

        // Account and token were persisted before the send stalled.
        assert_eq!(accounts.list().await.unwrap().len(), 1);
        let body = notifier.body.lock().await.clone().unwrap();
        let (_, token) = body.rsplit_once("token=").unwrap();
        assert!(matches!(
            tokens.take(token, Utc::now()).await.unwrap(),
            crate::database::TakeOutcome::Taken(_)
        ));
    }

    #[tokio::test]
    async fn login_on_an_unverified_account_fails_regardless_of_password() {
        let fx = fixture();
        fx.service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        let with_correct = fx.service.login("alice@example.com", "hunter2!").await;
        let with_wrong = fx.service.login("alice@example.com", "wrong").await;
        assert!(matches!(with_correct, Err(AuthError::AccountNotVerified)));
        assert!(matches!(with_wrong, Err(AuthError::AccountNotVerified)));
    }

    #[tokio::test]
    async fn verify_flips_the_account_and_consumes_the_token() {
        let fx = fixture();
        let account = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();
        let token = fx.notifier.last_token().await;

        fx.service.verify(&token).await.unwrap();
        let stored = fx.accounts.find_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.verified);

        // Second use of the same token string is invalid, not "already
        // verified".
        let err = fx.service.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected_and_left_for_housekeeping() {
        let fx = fixture();
        let account = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();
        fx.tokens
            .insert(VerificationTokenRecord {
                id: Uuid::new_v4(),
                token: "stale-token".to_string(),
                account_id: account.id,
                expires_at: Utc::now() - Duration::hours(1),
            })
            .await
            .unwrap();

        let err = fx.service.verify("stale-token").await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
        let stored = fx.accounts.find_by_id(account.id).await.unwrap().unwrap();
        assert!(!stored.verified);
    }

    #[tokio::test]
    async fn login_after_verification_issues_a_decodable_token() {
        let fx = fixture();
        fx.service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();
        let token = fx.notifier.last_token().await;
        fx.service.verify(&token).await.unwrap();

        let bearer = fx
            .service
            .login("alice@example.com", "hunter2!")
            .await
            .unwrap();
        let issuer = TokenIssuer::new("test-secret", 3600);
        assert_eq!(issuer.verify(&bearer).unwrap(), "alice@example.com");

        let err = fx
            .service
            .login("alice@example.com", "wrong password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_an_unknown_email_fails() {
        let fx = fixture();
        let err = fx
            .service
            .login("nobody@example.com", "hunter2!")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_of_one_email_has_exactly_one_winner() {
        let fx = fixture();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = fx.service.clone();
            handles.push(tokio::spawn(async move {
                service.register(register_request("alice@example.com")).await
            }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthError::AccountAlreadyExists) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(fx.accounts.list().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_verification_has_exactly_one_winner() {
        let fx = fixture();
        fx.service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();
        let token = fx.notifier.last_token().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = fx.service.clone();
            let token = token.clone();
            handles.push(tokio::spawn(
                async move { service.verify(&token).await },
            ));
        }

        let mut successes = 0;
        let mut invalid = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(AuthError::InvalidToken) => invalid += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(invalid, 7);
    }

    #[tokio::test]
    async fn principal_requires_a_valid_token_and_a_verified_account() {
        let fx = fixture();
        let account = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();

        // Forged or garbage bearers resolve to nothing.
        assert!(fx.service.principal("garbage").await.is_none());

        // A signed token for an unverified account is not a usable principal.
        let issuer = TokenIssuer::new("test-secret", 3600);
        let bearer = issuer.issue("alice@example.com").unwrap();
        assert!(fx.service.principal(&bearer).await.is_none());

        let token = fx.notifier.last_token().await;
        fx.service.verify(&token).await.unwrap();
        let principal = fx.service.principal(&bearer).await.unwrap();
        assert_eq!(principal.email, "alice@example.com");
        assert_eq!(principal.account_id, account.id);
    }

    #[tokio::test]
    async fn admin_accessors_cover_lookup_and_deletion() {
        let fx = fixture();
        let account = fx
            .service
            .register(register_request("alice@example.com"))
            .await
            .unwrap();
        fx.service
            .register(register_request("bob@example.com"))
            .await
            .unwrap();

        assert!(fx.service.account(account.id).await.unwrap().is_some());
        assert!(fx
            .service
            .account_by_email("ALICE@example.com")
            .await
            .unwrap()
            .is_some());
        assert_eq!(fx.service.accounts().await.unwrap().len(), 2);

        assert!(fx.service.delete_account(account.id).await.unwrap());
        assert!(!fx.service.delete_account(account.id).await.unwrap());
        assert_eq!(fx.service.delete_all_accounts().await.unwrap(), 1);
        assert!(fx.service.accounts().await.unwrap().is_empty());
    }
}
