//! # Token Keeper Library
//!
//! Keeps a single OAuth2 access token valid for calling a third-party API.
//! The token pair lives in a local SQLite file and is renewed through the
//! refresh-token grant shortly before it expires.
//!
//! Modules:
//! - `config` — service configuration, env expansion and validation
//! - `cache` — the token record and the refresh policy
//! - `store` — single-record persistence
//! - `sources` — the OAuth2 refresh-grant client
//! - `server` — HTTP surface exposing the token and metrics

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod resilience;
pub mod server;
pub mod sources;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::refresher::CredentialRefresher;
pub use crate::cache::token::TokenRecord;
pub use crate::config::service::ServiceConfig;
pub use crate::error::TokenError;
