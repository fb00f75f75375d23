//! Minimal Cloud Storage JSON API client: enough to list a project's buckets
//! with the exchanged credentials.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::cache::TokenProvider;
use crate::credentials::Credentials;
use crate::utils::constants::DEFAULT_STORAGE_URL;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBucketsResponse {
    #[serde(default)]
    items: Vec<Bucket>,
    next_page_token: Option<String>,
}

pub struct StorageClient<P> {
    client: Client,
    base_url: String,
    credentials: Credentials<P>,
}

impl<P: TokenProvider> StorageClient<P> {
    pub fn new(client: Client, credentials: Credentials<P>) -> Self {
        Self::with_base_url(client, credentials, DEFAULT_STORAGE_URL)
    }

    pub fn with_base_url<S: Into<String>>(
        client: Client,
        credentials: Credentials<P>,
        base_url: S,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    /// All buckets of `project`, following `nextPageToken` until exhausted.
    pub async fn list_buckets(&self, project: &str) -> Result<Vec<Bucket>> {
        let url = format!("{}/storage/v1/b", self.base_url.trim_end_matches('/'));
        let mut buckets = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("project", project.to_owned())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let request = self
                .credentials
                .authorize(self.client.get(&url).query(&query))
                .await
                .context("failed to obtain storage credentials")?;

            let response = request.send().await.context("list buckets request failed")?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(anyhow!("list buckets failed: {} - {}", status, body));
            }

            let page: ListBucketsResponse = response
                .json()
                .await
                .context("malformed list buckets response")?;
            debug!(count = page.items.len(), "received bucket page");
            buckets.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(buckets)
    }
}
