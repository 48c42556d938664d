//! Request and response bodies for the relay endpoints.

use crate::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Body accepted by the context-aware chat relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRelayRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Uniform `{choices: [...]}` envelope returned by the chat relay for
/// success and failure alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoicesEnvelope {
    pub choices: Vec<Value>,
}

impl ChoicesEnvelope {
    /// Wrap upstream choices verbatim.
    pub fn new(choices: Vec<Value>) -> Self {
        Self { choices }
    }

    /// Single assistant-shaped choice carrying `content`, used for errors so
    /// clients render them like any reply.
    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![json!({
                "message": {
                    "role": "assistant",
                    "content": content.into(),
                }
            })],
        }
    }

    /// Content of the first choice's message, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(Value::as_str)
    }
}

/// Body accepted by the stateless chat relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Query or body accepted by the search relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// `{error: "..."}` body used by the simple relays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
