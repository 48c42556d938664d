//! Chat completion upstream.

use crate::{UpstreamError, UpstreamReply, http_client, read_reply};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use swiftdesk_protocol::ChatMessage;

/// Request body sent to a chat completion API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Chat completion API.
#[async_trait]
pub trait ChatCompletionProvider: Send + Sync {
    /// Send a completion request and return the raw reply, whatever its
    /// status. Only a failure to get any reply is an error.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError>;
}

/// OpenAI-compatible `/v1/chat/completions` client.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiChatClient {
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
impl ChatCompletionProvider for OpenAiChatClient {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        debug!(
            "chat completion request (model={}, messages={})",
            request.model,
            request.messages.len()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let reply = read_reply(response).await?;
        debug!("chat completion reply (status={})", reply.status);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatCompletionProvider, ChatCompletionRequest, OpenAiChatClient};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use swiftdesk_protocol::ChatMessage;

    async fn spawn_fake_openai() -> String {
        async fn completions(
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            let authorized = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                == Some("Bearer sk-test");
            if !authorized {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "bad key" } })),
                );
            }
            let echoed = body["messages"].as_array().map(Vec::len).unwrap_or(0);
            (
                StatusCode::OK,
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": format!("{echoed} messages") } }],
                    "model": body["model"],
                })),
            )
        }
        let app = Router::new().route("/v1/chat/completions", post(completions));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: Some(0.7),
        }
    }

    #[test]
    fn request_omits_missing_temperature() {
        let mut request = request();
        request.temperature = None;
        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("temperature").is_none());
    }

    #[tokio::test]
    async fn complete_sends_bearer_key_and_body() {
        let endpoint = spawn_fake_openai().await;
        let client = OpenAiChatClient::new(endpoint, "sk-test", None).expect("client");
        let reply = client.complete(&request()).await.expect("reply");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["choices"][0]["message"]["content"], "2 messages");
        assert_eq!(reply.body["model"], "gpt-4o");
    }

    #[tokio::test]
    async fn complete_returns_error_status_as_reply() {
        let endpoint = spawn_fake_openai().await;
        let client = OpenAiChatClient::new(endpoint, "wrong", None).expect("client");
        let reply = client.complete(&request()).await.expect("reply");
        assert_eq!(reply.status, 401);
        assert!(reply.error_message().contains("bad key"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let client =
            OpenAiChatClient::new("http://127.0.0.1:9/v1/chat/completions", "k", None)
                .expect("client");
        let err = client.complete(&request()).await.expect_err("transport");
        assert!(matches!(err, crate::UpstreamError::Transport(_)));
    }
}
