// tests/common/mod.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;
use serde_json::json;

use crate::cache::CachingTokenSource;
use crate::config::exchange::ExchangeConfig;
use crate::errors::TokenError;
use crate::helpers::time::Clock;
use crate::sources::FetchIdentityDocument;

pub const AUDIENCE: &str =
    "//iam.googleapis.com/projects/123456/locations/global/workloadIdentityPools/spire/providers/spire";
pub const SERVICE_ACCOUNT: &str = "bucket-reader@demo.iam.gserviceaccount.com";
pub const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const STS_PATH: &str = "/v1/token";
pub const IAM_PATH: &str =
    "/v1/projects/-/serviceAccounts/bucket-reader@demo.iam.gserviceaccount.com:generateAccessToken";
pub const ASSERTION: &str = "eyJhbGciOiJFUzI1NiJ9.eyJzdWIiOiJzcGlmZmU6Ly9kZW1vL3dvcmtsb2FkIn0.c2ln";

/// Identity agent stand-in that counts how often it was asked.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pub calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchIdentityDocument for StaticFetcher {
    async fn fetch_identity_document(&self, audience: &str) -> Result<String, TokenError> {
        assert_eq!(audience, AUDIENCE);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ASSERTION.to_owned())
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn jan_first(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, min, 0).unwrap()
}

/// Exchange config pointing both endpoints at `server`.
pub fn exchange_config(server: &MockServer) -> ExchangeConfig {
    ExchangeConfig::new(SERVICE_ACCOUNT, AUDIENCE)
        .with_sts_url(server.url(STS_PATH))
        .with_iam_credentials_url(server.base_url())
        .with_http_timeout(Duration::from_secs(5))
}

pub fn token_source(
    server: &MockServer,
    fetcher: StaticFetcher,
    clock: Arc<ManualClock>,
) -> CachingTokenSource<StaticFetcher> {
    CachingTokenSource::new(exchange_config(server), fetcher, Client::new()).with_clock(clock)
}

pub async fn mock_sts<'a>(server: &'a MockServer, access_token: &str, delay: Duration) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(STS_PATH)
                .json_body(json!({
                    "grantType": "urn:ietf:params:oauth:grant-type:token-exchange",
                    "audience": AUDIENCE,
                    "scope": SCOPE,
                    "requestedTokenType": "urn:ietf:params:oauth:token-type:access_token",
                    "subjectToken": ASSERTION,
                    "subjectTokenType": "urn:ietf:params:oauth:token-type:jwt"
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .delay(delay)
                .json_body(json!({
                    "access_token": access_token,
                    "expires_in": 3600,
                    "token_type": "Bearer",
                    "issued_token_type": "urn:ietf:params:oauth:token-type:access_token"
                }));
        })
        .await
}

pub async fn mock_iam<'a>(
    server: &'a MockServer,
    federated_token: &str,
    access_token: &str,
    expire_time: &str,
) -> Mock<'a> {
    let bearer = format!("Bearer {}", federated_token);
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(IAM_PATH)
                .header("authorization", bearer.as_str())
                .json_body(json!({ "scope": [SCOPE] }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "accessToken": access_token,
                    "expireTime": expire_time
                }));
        })
        .await
}
