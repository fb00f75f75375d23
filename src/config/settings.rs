use serde::Deserialize;

use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SAFETY_MARGIN_SECS};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    /// cached token is treated as expired this many seconds before its expiry
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,
    /// overall deadline for each STS / IAM / storage HTTP call
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            retry: None,
            logging: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// max delay for retrying
    /// invariant: >= base_delay_ms.
    pub max_delay_ms: Option<u64>,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_safety_margin_seconds() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

fn default_http_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
