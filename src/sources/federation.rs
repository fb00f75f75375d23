use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::TokenError;
use crate::sources::identity::IdentityAssertion;
use crate::utils::constants::{GRANT_TYPE_TOKEN_EXCHANGE, TOKEN_TYPE_ACCESS_TOKEN, TOKEN_TYPE_JWT};

const ENDPOINT: &str = "sts";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenExchangeRequest<'a> {
    grant_type: &'static str,
    audience: &'a str,
    scope: &'a str,
    requested_token_type: &'static str,
    subject_token: &'a str,
    subject_token_type: &'static str,
}

/// Short-lived federated access token returned by STS.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct FederatedToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub issued_token_type: String,
}

impl fmt::Debug for FederatedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedToken")
            .field("access_token", &"[censored]")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("issued_token_type", &self.issued_token_type)
            .finish()
    }
}

/// RFC 8693 token exchange against the STS endpoint. Single attempt, no retries.
#[derive(Debug, Clone)]
pub struct FederationExchanger {
    client: Client,
    sts_url: String,
    timeout: Duration,
}

impl FederationExchanger {
    pub fn new<S: Into<String>>(client: Client, sts_url: S, timeout: Duration) -> Self {
        Self {
            client,
            sts_url: sts_url.into(),
            timeout,
        }
    }

    pub async fn exchange(
        &self,
        assertion: &IdentityAssertion,
        audience: &str,
        scope: &str,
    ) -> Result<FederatedToken, TokenError> {
        let body = TokenExchangeRequest {
            grant_type: GRANT_TYPE_TOKEN_EXCHANGE,
            audience,
            scope,
            requested_token_type: TOKEN_TYPE_ACCESS_TOKEN,
            subject_token: assertion.as_str(),
            subject_token_type: TOKEN_TYPE_JWT,
        };

        let response = self
            .client
            .post(&self.sts_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| TokenError::from_reqwest(ENDPOINT, self.timeout, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), url = %self.sts_url, "token exchange rejected");
            return Err(TokenError::ExchangeRejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TokenError::from_reqwest(ENDPOINT, self.timeout, e))?;
        let token: FederatedToken =
            serde_json::from_str(&text).map_err(|e| TokenError::ResponseMalformed {
                endpoint: ENDPOINT,
                reason: e.to_string(),
            })?;

        debug!(
            expires_in = token.expires_in,
            issued_token_type = %token.issued_token_type,
            "federated token issued"
        );
        Ok(token)
    }
}
