//! Main entry point for the user-service backend.
//!
//! This file initializes the Axum web server, loads configuration, wires the
//! stores, mail notifier, password hasher and token issuer into the
//! authentication service, and registers all API routes and middleware.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod mailer;
mod middleware;

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::Duration;
use tracing_subscriber::EnvFilter;

use auth::password::PasswordHasher;
use auth::service::{AuthService, AuthSettings};
use auth::tokens::TokenIssuer;
use config::Config;
use database::memory::{MemoryAccountStore, MemoryVerificationTokenStore};
use mailer::{LogNotifier, Notifier, SmtpNotifier};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => match SmtpNotifier::new(smtp) {
            Ok(notifier) => Arc::new(notifier),
            Err(err) => {
                tracing::error!(%err, "invalid smtp configuration");
                std::process::exit(1);
            }
        },
        None => Arc::new(LogNotifier),
    };

    let service = AuthService::new(
        Arc::new(MemoryAccountStore::new()),
        Arc::new(MemoryVerificationTokenStore::new()),
        notifier,
        PasswordHasher::new(config.bcrypt_cost),
        TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_secs),
        AuthSettings {
            public_base_url: config.public_base_url.clone(),
            verification_ttl: Duration::hours(config.verification_ttl_hours),
            mail_timeout: config.mail_timeout,
        },
    );

    let app = Router::new()
        .route("/", get(root_handler))
        .nest(
            "/users",
            auth::routes::router().merge(api::user::routes::router()),
        )
        .layer(axum::middleware::from_fn_with_state(
            service.clone(),
            auth::middleware::authenticate,
        ))
        .layer(axum::middleware::from_fn(middleware::trace_request))
        .with_state(service);

    tracing::info!("listening on {}", config.listen_addr);

    axum::Server::bind(&config.listen_addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

async fn root_handler() -> &'static str {
    "user-service is running"
}
