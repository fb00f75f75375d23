//! Credential injection for outgoing HTTP requests.

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::HeaderValue;
use reqwest::{Client, RequestBuilder};

use crate::cache::{spiffe_token_source, CachingTokenSource, TokenProvider};
use crate::config::exchange::ExchangeConfig;
use crate::errors::TokenError;
use crate::sources::SpiffeWorkloadClient;

/// Attaches `Authorization: Bearer <token>` from any [`TokenProvider`].
#[derive(Debug)]
pub struct Credentials<P> {
    provider: Arc<P>,
}

impl<P> Clone for Credentials<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

impl<P: TokenProvider> Credentials<P> {
    pub fn new(provider: P) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    pub fn from_shared(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sensitive `Authorization` header value for the current token.
    pub async fn authorization_header(&self) -> Result<HeaderValue, TokenError> {
        let token = self.provider.token().await?;
        let mut value = HeaderValue::from_str(&format!("{} {}", token.token_type, token.access_token))
            .map_err(|e| TokenError::ResponseMalformed {
                endpoint: "iamcredentials",
                reason: format!("access token is not a valid header value: {}", e),
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, TokenError> {
        Ok(request.header(AUTHORIZATION, self.authorization_header().await?))
    }
}

/// Default chain impersonating `service_account` through the workload identity provider `audience`.
pub fn credentials<S: Into<String>, A: Into<String>>(
    service_account: S,
    audience: A,
    client: Client,
) -> Credentials<CachingTokenSource<SpiffeWorkloadClient>> {
    Credentials::new(spiffe_token_source(
        ExchangeConfig::new(service_account, audience),
        client,
    ))
}
