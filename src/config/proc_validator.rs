//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - audience / workload identity exclusivity
//! - endpoint URL and agent socket schemes
//! - timeout and retry invariants

use tracing::{error, info};

use crate::config::exchange::ExchangeSettings;
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::config::types::ServiceConfig;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_exchange(&cfg.exchange, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http_timeout_seconds == 0 {
        errors.push("settings.http_timeout_seconds must be greater than 0".to_string());
    }
    if let Some(retry) = &settings.retry {
        validate_retry(retry, errors);
    }
    if let Some(logging) = &settings.logging {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of trace, debug, info, warn, error",
                logging.level
            ));
        }
    }
}

fn validate_retry(retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push("settings.retry.attempts must be at least 1".to_string());
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "settings.retry.max_delay_ms ({}) must be >= base_delay_ms ({})",
                max, base
            ));
        }
    }
}

fn validate_exchange(exchange: &ExchangeSettings, errors: &mut Vec<String>) {
    if exchange.service_account.trim().is_empty() {
        errors.push("exchange.service_account is required".to_string());
    }

    match (&exchange.audience, &exchange.workload_identity) {
        (None, None) => errors.push(
            "exchange: one of 'audience' or 'workload_identity' is required".to_string(),
        ),
        (Some(_), Some(_)) => errors.push(
            "exchange: 'audience' and 'workload_identity' are mutually exclusive".to_string(),
        ),
        (Some(audience), None) if audience.trim().is_empty() => {
            errors.push("exchange.audience must not be empty".to_string())
        }
        (None, Some(wi)) => {
            for (field, value) in [
                ("project_number", &wi.project_number),
                ("pool_id", &wi.pool_id),
                ("provider_id", &wi.provider_id),
            ] {
                if value.trim().is_empty() {
                    errors.push(format!("exchange.workload_identity.{} must not be empty", field));
                }
            }
        }
        _ => {}
    }

    if exchange.scope.trim().is_empty() {
        errors.push("exchange.scope must not be empty".to_string());
    }

    for (field, url) in [
        ("sts_url", &exchange.sts_url),
        ("iam_credentials_url", &exchange.iam_credentials_url),
    ] {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            errors.push(format!("exchange.{} '{}' must be an http(s) URL", field, url));
        }
    }

    if !exchange.spiffe_socket_path.starts_with("unix:")
        && !exchange.spiffe_socket_path.starts_with("tcp:")
    {
        errors.push(format!(
            "exchange.spiffe_socket_path '{}' must start with unix: or tcp:",
            exchange.spiffe_socket_path
        ));
    }

    if exchange.identity_fetch_timeout_seconds == 0 {
        errors.push("exchange.identity_fetch_timeout_seconds must be greater than 0".to_string());
    }
}
