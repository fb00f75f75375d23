use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::TokenError;
use crate::helpers::time::parse_expire_time;

const ENDPOINT: &str = "iamcredentials";

#[derive(Debug, Serialize)]
struct GenerateAccessTokenRequest<'a> {
    scope: [&'a str; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateAccessTokenResponse {
    access_token: String,
    expire_time: String,
}

/// Service account access token with its server-declared absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct ImpersonatedToken {
    pub access_token: String,
    pub expiry: DateTime<Utc>,
}

impl fmt::Debug for ImpersonatedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpersonatedToken")
            .field("access_token", &"[censored]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// generateAccessToken endpoint of `service_account` under `base_url`.
pub fn generate_access_token_url(base_url: &str, service_account: &str) -> String {
    format!(
        "{}/v1/projects/-/serviceAccounts/{}:generateAccessToken",
        base_url.trim_end_matches('/'),
        service_account
    )
}

/// Calls IAM credentials generateAccessToken with a federated bearer token.
#[derive(Debug, Clone)]
pub struct ImpersonationClient {
    client: Client,
    iam_credentials_url: String,
    timeout: Duration,
}

impl ImpersonationClient {
    pub fn new<S: Into<String>>(client: Client, iam_credentials_url: S, timeout: Duration) -> Self {
        Self {
            client,
            iam_credentials_url: iam_credentials_url.into(),
            timeout,
        }
    }

    pub async fn impersonate(
        &self,
        federated_access_token: &str,
        service_account: &str,
        scope: &str,
    ) -> Result<ImpersonatedToken, TokenError> {
        let url = generate_access_token_url(&self.iam_credentials_url, service_account);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(federated_access_token)
            .json(&GenerateAccessTokenRequest { scope: [scope] })
            .send()
            .await
            .map_err(|e| TokenError::from_reqwest(ENDPOINT, self.timeout, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), service_account, "service account impersonation rejected");
            return Err(TokenError::ImpersonationRejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TokenError::from_reqwest(ENDPOINT, self.timeout, e))?;
        let body: GenerateAccessTokenResponse =
            serde_json::from_str(&text).map_err(|e| TokenError::ResponseMalformed {
                endpoint: ENDPOINT,
                reason: e.to_string(),
            })?;

        let expiry = parse_expire_time(&body.expire_time)?;
        debug!(service_account, %expiry, "service account token issued");

        Ok(ImpersonatedToken {
            access_token: body.access_token,
            expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    const SA: &str = "reader@demo.iam.gserviceaccount.com";
    const PATH: &str = "/v1/projects/-/serviceAccounts/reader@demo.iam.gserviceaccount.com:generateAccessToken";

    fn impersonation(server: &MockServer) -> ImpersonationClient {
        ImpersonationClient::new(Client::new(), server.base_url(), Duration::from_secs(5))
    }

    #[test]
    fn url_targets_the_service_account() {
        assert_eq!(
            generate_access_token_url("https://iamcredentials.googleapis.com/", SA),
            "https://iamcredentials.googleapis.com/v1/projects/-/serviceAccounts/reader@demo.iam.gserviceaccount.com:generateAccessToken"
        );
    }

    #[tokio::test]
    async fn federated_token_is_presented_as_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header("authorization", "Bearer FED1")
                    .json_body(json!({"scope": ["https://www.googleapis.com/auth/cloud-platform"]}));
                then.status(200).json_body(json!({
                    "accessToken": "SA1",
                    "expireTime": "2025-01-01T00:10:00Z"
                }));
            })
            .await;

        let token = impersonation(&server)
            .impersonate("FED1", SA, "https://www.googleapis.com/auth/cloud-platform")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token.access_token, "SA1");
        assert_eq!(token.expiry, Utc.with_ymd_and_hms(2025, 1, 1, 0, 10, 0).unwrap());
    }

    #[tokio::test]
    async fn fractional_expiry_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({
                    "accessToken": "SA1",
                    "expireTime": "2025-01-01T00:10:00.500Z"
                }));
            })
            .await;

        let err = impersonation(&server)
            .impersonate("FED1", SA, "scope")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TokenError::TimestampMalformed {
                value: "2025-01-01T00:10:00.500Z".into()
            }
        );
    }

    #[tokio::test]
    async fn non_200_is_rejected_with_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(404);
            })
            .await;

        let err = impersonation(&server)
            .impersonate("FED1", SA, "scope")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TokenError::ImpersonationRejected {
                status: 404,
                status_text: "Not Found".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_fields_are_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({"accessToken": "SA1"}));
            })
            .await;

        let err = impersonation(&server)
            .impersonate("FED1", SA, "scope")
            .await
            .unwrap_err();

        assert!(matches!(err, TokenError::ResponseMalformed { endpoint: "iamcredentials", .. }));
    }
}
