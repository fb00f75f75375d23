use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

/// Shared client for STS, IAM and storage calls; `timeout` bounds each whole request.
pub fn build(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}
