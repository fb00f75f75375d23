//! # SPIFFE to Google Cloud token library
//!
//! Turns a JWT-SVID from the local SPIFFE Workload API into a Google Cloud
//! service account access token: workload identity federation (STS token
//! exchange) followed by service account impersonation. The result is cached
//! and reused until it expires.
//!
//! Modules:
//! - `config` — exchange parameters, YAML settings, validation
//! - `sources` — identity document fetch, token exchange, impersonation
//! - `cache` — cached token and the caching token source
//! - `credentials` — bearer header injection for HTTP requests
//! - `storage` — bucket listing with the exchanged credentials

pub mod cache;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod helpers;
pub mod resilience;
pub mod sources;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::{CachedToken, CachingTokenSource, TokenProvider};
pub use crate::config::exchange::{default_audience, ExchangeConfig};
pub use crate::credentials::{credentials, Credentials};
pub use crate::errors::TokenError;
