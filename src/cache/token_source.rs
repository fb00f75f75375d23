use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::token::CachedToken;
use crate::config::exchange::ExchangeConfig;
use crate::errors::TokenError;
use crate::helpers::time::{Clock, SystemClock};
use crate::sources::{
    FederationExchanger, FetchIdentityDocument, IdentityDocumentFetcher, ImpersonationClient,
    SpiffeWorkloadClient,
};

/// Something that hands out bearer tokens.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> impl Future<Output = Result<CachedToken, TokenError>> + Send;
}

/// Identity document -> federated token -> service account token, reused until expiry.
///
/// The cache is guarded by an async mutex held across the whole
/// check-and-refresh sequence: callers arriving during a refresh wait for it
/// and then read the new value, so an expired cache triggers exactly one
/// pipeline run no matter how many callers observe it.
#[derive(Debug)]
pub struct CachingTokenSource<F> {
    config: ExchangeConfig,
    fetcher: IdentityDocumentFetcher<F>,
    exchanger: FederationExchanger,
    impersonator: ImpersonationClient,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<CachedToken>>,
}

/// Token source backed by the SPIFFE Workload API at `config.spiffe_socket_path`.
pub fn spiffe_token_source(
    config: ExchangeConfig,
    client: Client,
) -> CachingTokenSource<SpiffeWorkloadClient> {
    let fetcher = SpiffeWorkloadClient::new(config.spiffe_socket_path.to_owned());
    CachingTokenSource::new(config, fetcher, client)
}

impl<F: FetchIdentityDocument> CachingTokenSource<F> {
    pub fn new(config: ExchangeConfig, fetcher: F, client: Client) -> Self {
        Self {
            fetcher: IdentityDocumentFetcher::new(fetcher, config.identity_fetch_timeout),
            exchanger: FederationExchanger::new(
                client.clone(),
                config.sts_url.to_owned(),
                config.http_timeout,
            ),
            impersonator: ImpersonationClient::new(
                client,
                config.iam_credentials_url.to_owned(),
                config.http_timeout,
            ),
            clock: Arc::new(SystemClock),
            cached: Mutex::new(None),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    async fn refresh(&self) -> Result<CachedToken, TokenError> {
        let config = &self.config;

        let assertion = self.fetcher.fetch(&config.audience).await?;
        let federated = self
            .exchanger
            .exchange(&assertion, &config.audience, &config.scope)
            .await?;
        let impersonated = self
            .impersonator
            .impersonate(&federated.access_token, &config.service_account, &config.scope)
            .await?;

        Ok(CachedToken::from(impersonated))
    }
}

impl<F: FetchIdentityDocument> TokenProvider for CachingTokenSource<F> {
    async fn token(&self) -> Result<CachedToken, TokenError> {
        let mut cached = self.cached.lock().await;

        let now = self.clock.now();
        if let Some(token) = cached
            .as_ref()
            .filter(|token| token.is_valid_at(now, self.config.safety_margin))
        {
            debug!(expiry = %token.expiry, "reusing cached token");
            return Ok(token.clone());
        }

        debug!(service_account = %self.config.service_account, "cached token missing or expired, refreshing");
        let token = self.refresh().await.inspect_err(|e| {
            warn!(service_account = %self.config.service_account, error = %e, "token refresh failed");
        })?;

        info!(
            service_account = %self.config.service_account,
            expiry = %token.expiry,
            "service account token refreshed"
        );
        *cached = Some(token.clone());
        Ok(token)
    }
}
