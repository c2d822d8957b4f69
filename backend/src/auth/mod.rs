//! Authentication module for managing the account lifecycle and access control.
//!
//! This module provides the public interface for registration with email
//! verification, login with bearer-token issuance, password hashing, and the
//! authorization middleware stage.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod tokens;

// Re-exports for convenience
pub use errors::*;
pub use handlers::*;
pub use middleware::*;
pub use models::*;
pub use routes::*;
pub use service::*;
