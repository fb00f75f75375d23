use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IAM_CREDENTIALS_URL, DEFAULT_IDENTITY_FETCH_TIMEOUT_SECS,
    DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_SCOPE, DEFAULT_SPIFFE_SOCKET_PATH, DEFAULT_STS_URL,
};

/// Formats the audience of a workload identity pool provider.
pub fn default_audience(project_number: &str, pool_id: &str, provider_id: &str) -> String {
    format!(
        "//iam.googleapis.com/projects/{}/locations/global/workloadIdentityPools/{}/providers/{}",
        project_number, pool_id, provider_id
    )
}

/// ================================
/// `exchange` block of the YAML file
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeSettings {
    #[serde(default = "default_spiffe_socket_path")]
    pub spiffe_socket_path: String,
    /// explicit audience, mutually exclusive with `workload_identity`
    pub audience: Option<String>,
    pub workload_identity: Option<WorkloadIdentityConfig>,
    #[serde(default)]
    pub service_account: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_sts_url")]
    pub sts_url: String,
    #[serde(default = "default_iam_credentials_url")]
    pub iam_credentials_url: String,
    #[serde(default = "default_identity_fetch_timeout_seconds")]
    pub identity_fetch_timeout_seconds: u64,
}

/// Coordinates of a workload identity pool provider.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkloadIdentityConfig {
    pub project_number: String,
    pub pool_id: String,
    pub provider_id: String,
}

impl WorkloadIdentityConfig {
    pub fn audience(&self) -> String {
        default_audience(&self.project_number, &self.pool_id, &self.provider_id)
    }
}

/// Immutable parameters of one credential chain.
///
/// Built once and shared by every refresh of a
/// [`CachingTokenSource`](crate::cache::token_source::CachingTokenSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub spiffe_socket_path: String,
    pub audience: String,
    pub service_account: String,
    pub scope: String,
    pub sts_url: String,
    pub iam_credentials_url: String,
    pub identity_fetch_timeout: Duration,
    /// per-request deadline of the STS and IAM calls
    pub http_timeout: Duration,
    pub safety_margin: Duration,
}

impl ExchangeConfig {
    /// Default chain for `service_account`: well-known agent socket, cloud-platform scope,
    /// public Google endpoints.
    pub fn new<S: Into<String>, A: Into<String>>(service_account: S, audience: A) -> Self {
        Self {
            spiffe_socket_path: DEFAULT_SPIFFE_SOCKET_PATH.to_owned(),
            audience: audience.into(),
            service_account: service_account.into(),
            scope: DEFAULT_SCOPE.to_owned(),
            sts_url: DEFAULT_STS_URL.to_owned(),
            iam_credentials_url: DEFAULT_IAM_CREDENTIALS_URL.to_owned(),
            identity_fetch_timeout: Duration::from_secs(DEFAULT_IDENTITY_FETCH_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            safety_margin: Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS),
        }
    }

    pub fn with_spiffe_socket_path<S: Into<String>>(mut self, path: S) -> Self {
        self.spiffe_socket_path = path.into();
        self
    }

    pub fn with_scope<S: Into<String>>(mut self, scope: S) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_sts_url<S: Into<String>>(mut self, url: S) -> Self {
        self.sts_url = url.into();
        self
    }

    pub fn with_iam_credentials_url<S: Into<String>>(mut self, url: S) -> Self {
        self.iam_credentials_url = url.into();
        self
    }

    pub fn with_identity_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.identity_fetch_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }
}

fn default_spiffe_socket_path() -> String {
    DEFAULT_SPIFFE_SOCKET_PATH.to_owned()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_owned()
}

fn default_sts_url() -> String {
    DEFAULT_STS_URL.to_owned()
}

fn default_iam_credentials_url() -> String {
    DEFAULT_IAM_CREDENTIALS_URL.to_owned()
}

fn default_identity_fetch_timeout_seconds() -> u64 {
    DEFAULT_IDENTITY_FETCH_TIMEOUT_SECS
}
