//! Central module for application-wide configuration settings.
//!
//! This module loads configuration from environment variables: the listen
//! address, the public base URL embedded in verification links, JWT signing
//! material and lifetimes, bcrypt cost, and the optional SMTP block. Missing
//! required keys and unparseable values are reported as `ConfigError` at
//! startup instead of surfacing mid-request.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// SMTP relay settings. Present only when all of `SMTP_HOST`,
/// `SMTP_USERNAME`, `SMTP_PASSWORD` and `SMTP_FROM` are set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Base URL the verification link is built from, without a trailing slash.
    pub public_base_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    pub verification_ttl_hours: i64,
    pub bcrypt_cost: u32,
    /// Upper bound on a single outbound mail attempt.
    pub mail_timeout: Duration,
    pub smtp: Option<SmtpConfig>,
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = parsed("LISTEN_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let public_base_url = optional("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{listen_addr}"))
            .trim_end_matches('/')
            .to_string();

        let smtp = match optional("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parsed("SMTP_PORT", 587)?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from: required("SMTP_FROM")?,
            }),
            None => None,
        };

        Ok(Self {
            listen_addr,
            public_base_url,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_secs: parsed("JWT_TTL_SECS", 86_400)?,
            verification_ttl_hours: parsed("VERIFICATION_TTL_HOURS", 24)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            mail_timeout: Duration::from_secs(parsed("MAIL_TIMEOUT_SECS", 10u64)?),
            smtp,
        })
    }
}
