//! Firebase Realtime Database backend over the REST API.

use crate::error::StoreError;
use crate::path::StorePath;
use crate::provider::{RemoteStore, empty_node};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use std::time::Duration;

/// Store speaking the Realtime Database REST protocol
/// (`{base}/{path}.json`, `GET`/`PUT`/`POST`).
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: Client,
    base_url: Url,
    auth: Option<String>,
}

impl FirebaseStore {
    /// Create a store for the database at `base_url`, authenticating with the
    /// optional database secret or ID token.
    pub fn new(
        base_url: impl Into<String>,
        auth: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self::with_client(builder.build()?, base_url, auth)
    }

    /// Create a store reusing an existing HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        auth: Option<String>,
    ) -> Result<Self, StoreError> {
        let raw = base_url.into();
        let base_url =
            Url::parse(&raw).map_err(|err| StoreError::InvalidUrl(format!("{raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(raw));
        }
        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// REST URL of a node. Each key is percent-encoded as one path segment.
    pub fn node_url(&self, path: &StorePath) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            match path.segments().split_last() {
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{last}.json"));
                }
                None => {
                    segments.push(".json");
                }
            }
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(auth) => request.query(&[("auth", auth.as_str())]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let response = self.authorize(request).send().await?;
        read_body(response).await
    }
}

/// Decode a success body or turn the status into an error.
async fn read_body(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    async fn fetch_node(&self, path: &StorePath) -> Result<Value, StoreError> {
        debug!("firebase get (path={path})");
        let value = self.send(self.client.get(self.node_url(path))).await?;
        Ok(if value.is_null() { empty_node() } else { value })
    }

    async fn write_node(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        debug!("firebase put (path={path})");
        self.send(self.client.put(self.node_url(path)).json(&value))
            .await?;
        Ok(())
    }

    async fn append_node(&self, path: &StorePath, entry: Value) -> Result<String, StoreError> {
        debug!("firebase post (path={path})");
        let value = self
            .send(self.client.post(self.node_url(path)).json(&entry))
            .await?;
        value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Decode(format!("push response without name: {value}")))
    }
}
