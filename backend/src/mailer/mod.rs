//! Module for outbound mail delivery.
//!
//! This module defines the `Notifier` contract the authentication flow sends
//! verification emails through, an SMTP implementation backed by lettre, and
//! a log-only fallback used when no SMTP credentials are configured.

pub mod smtp;

use async_trait::async_trait;

pub use smtp::SmtpNotifier;

/// Failures raised while building or delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Outbound mail transport consumed by the authentication service.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Notifier that only logs the message. Used in development deployments
/// where SMTP is not configured; the verification link still shows up in
/// the service logs.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(%to, %subject, %body, "smtp not configured, logging mail instead");
        Ok(())
    }
}
