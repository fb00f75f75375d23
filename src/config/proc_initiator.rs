use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::config::exchange::ExchangeConfig;
use crate::config::types::ServiceConfig;

/// Resolve the validated file config into the immutable chain parameters.
pub fn exchange_config(config: &ServiceConfig) -> Result<ExchangeConfig> {
    let exchange = &config.exchange;
    let audience = exchange
        .audience
        .clone()
        .or_else(|| exchange.workload_identity.as_ref().map(|wi| wi.audience()))
        .ok_or_else(|| anyhow!("exchange: one of 'audience' or 'workload_identity' is required"))?;

    Ok(ExchangeConfig::new(exchange.service_account.to_owned(), audience)
        .with_spiffe_socket_path(exchange.spiffe_socket_path.to_owned())
        .with_scope(exchange.scope.to_owned())
        .with_sts_url(exchange.sts_url.to_owned())
        .with_iam_credentials_url(exchange.iam_credentials_url.to_owned())
        .with_identity_fetch_timeout(Duration::from_secs(exchange.identity_fetch_timeout_seconds))
        .with_http_timeout(Duration::from_secs(config.settings.http_timeout_seconds))
        .with_safety_margin(Duration::from_secs(config.settings.safety_margin_seconds)))
}
