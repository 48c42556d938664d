//! Web search upstream.

use crate::{UpstreamError, UpstreamReply, http_client, read_reply};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Web search API.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query and return the raw reply, whatever its status.
    async fn search(&self, query: &str, count: u32) -> Result<UpstreamReply, UpstreamError>;
}

/// Brave Search web API client.
#[derive(Debug, Clone)]
pub struct BraveSearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl BraveSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for BraveSearchClient {
    async fn search(&self, query: &str, count: u32) -> Result<UpstreamReply, UpstreamError> {
        debug!("web search (query_len={}, count={})", query.len(), count);
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query.to_string()), ("count", count.to_string())])
            .send()
            .await?;
        read_reply(response).await
    }
}
