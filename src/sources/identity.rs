use std::fmt;
use std::future::Future;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use spiffe::workload_api::client::WorkloadApiClient;
use tracing::debug;

use crate::errors::TokenError;

/// Call boundary to the local identity agent client library.
///
/// Implementations return the serialized JWT for `audience` and carry their own
/// transport policy; the deadline is applied by [`IdentityDocumentFetcher`].
pub trait FetchIdentityDocument: Send + Sync {
    fn fetch_identity_document(
        &self,
        audience: &str,
    ) -> impl Future<Output = Result<String, TokenError>> + Send;
}

/// SPIFFE Workload API client, connecting per fetch.
#[derive(Debug, Clone)]
pub struct SpiffeWorkloadClient {
    socket_path: String,
}

impl SpiffeWorkloadClient {
    pub fn new<S: Into<String>>(socket_path: S) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }
}

impl FetchIdentityDocument for SpiffeWorkloadClient {
    async fn fetch_identity_document(&self, audience: &str) -> Result<String, TokenError> {
        let mut client = WorkloadApiClient::new_from_path(&self.socket_path)
            .await
            .map_err(|e| {
                TokenError::IdentityUnavailable(format!(
                    "unable to connect to workload API at {}: {}",
                    self.socket_path, e
                ))
            })?;

        client
            .fetch_jwt_token(&[audience], None)
            .await
            .map_err(|e| TokenError::IdentityUnavailable(format!("unable to fetch JWT-SVID: {}", e)))
    }
}

/// Signed JWT issued by the identity agent. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityAssertion(String);

impl IdentityAssertion {
    pub fn new<S: Into<String>>(jwt: S) -> Self {
        Self(jwt.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `sub` claim, decoded without verification. Diagnostics only.
    pub fn subject(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct Claims {
            sub: Option<String>,
        }

        let payload = self.0.split('.').nth(1)?;
        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice::<Claims>(&decoded).ok()?.sub
    }
}

impl fmt::Debug for IdentityAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentityAssertion").field(&"[censored]").finish()
    }
}

/// Bounds any [`FetchIdentityDocument`] with a deadline. No retries.
#[derive(Debug, Clone)]
pub struct IdentityDocumentFetcher<F> {
    inner: F,
    timeout: Duration,
}

impl<F: FetchIdentityDocument> IdentityDocumentFetcher<F> {
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub async fn fetch(&self, audience: &str) -> Result<IdentityAssertion, TokenError> {
        let jwt = tokio::time::timeout(self.timeout, self.inner.fetch_identity_document(audience))
            .await
            .map_err(|_| TokenError::Timeout {
                operation: "identity document fetch",
                after: self.timeout,
            })??;

        let assertion = IdentityAssertion::new(jwt);
        debug!(
            subject = assertion.subject().as_deref().unwrap_or("<unknown>"),
            audience,
            "fetched identity assertion"
        );
        Ok(assertion)
    }
}
