//! Module for administrative user endpoints.
//!
//! This module handles user lookups and bulk maintenance operations that
//! are distinct from the core authentication flow: fetch by id or email,
//! list all accounts, and single or bulk deletion.

pub mod handlers;
pub mod routes;
