//! Clients for the third-party chat completion and web search APIs.
//!
//! Relays talk to upstreams only through [`ChatCompletionProvider`] and
//! [`SearchProvider`], so tests can substitute stubs.

mod chat;
mod error;
mod search;

pub use chat::{ChatCompletionProvider, ChatCompletionRequest, OpenAiChatClient};
pub use error::UpstreamError;
pub use search::{BraveSearchClient, SearchProvider};

use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;

/// Status and body returned by an upstream, relayed without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    /// HTTP status code.
    pub status: u16,
    /// JSON body. A non-JSON body shows up here as a JSON string, or `null`
    /// when empty.
    pub body: Value,
    /// The original body when it was not JSON.
    pub raw: Option<RawBody>,
}

/// Body text as received, with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBody {
    pub content_type: Option<String>,
    pub text: String,
}

impl UpstreamReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            raw: None,
        }
    }

    /// Reply whose body is not JSON and must be relayed as-is.
    pub fn verbatim(status: u16, content_type: Option<&str>, text: impl Into<String>) -> Self {
        let text = text.into();
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            Value::String(text.clone())
        };
        Self {
            status,
            body,
            raw: Some(RawBody {
                content_type: content_type.map(str::to_string),
                text,
            }),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort error text from an upstream failure body.
    pub fn error_message(&self) -> String {
        let detail = self
            .body
            .pointer("/error/message")
            .or_else(|| self.body.get("error"))
            .or_else(|| self.body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.body.to_string());
        format!("upstream returned status {}: {detail}", self.status)
    }
}

/// Read status and body from a response.
pub(crate) async fn read_reply(response: Response) -> Result<UpstreamReply, UpstreamError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let text = response.text().await?;
    Ok(match serde_json::from_str::<Value>(&text) {
        Ok(body) => UpstreamReply::new(status, body),
        Err(_) => UpstreamReply::verbatim(status, content_type.as_deref(), text),
    })
}

/// Build an HTTP client with the optional request timeout.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, UpstreamError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
