//! Wire protocol types for SwiftDesk requests, responses, and shared records.

mod notes;
mod relay;
mod usage;

pub use notes::{NoteCreated, NoteEntry, NoteList, NoteRequest};
pub use relay::{ChatRelayRequest, ChoicesEnvelope, ErrorBody, SearchRequest, SimpleChatRequest};
pub use usage::{DEFAULT_USAGE_MODEL, UsageStats};

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions prepended by the relay.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Single message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Epoch milliseconds, only present on UI-rendered messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ChatMessage {
    /// Build a message without a timestamp.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach a timestamp (epoch milliseconds).
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Copy of the message in the shape accepted by chat completion APIs.
    pub fn to_upstream(&self) -> Self {
        Self {
            role: self.role,
            content: self.content.clone(),
            timestamp: None,
        }
    }
}

/// Sort a transcript ascending by timestamp; untimed messages keep their
/// relative order ahead of timed ones.
pub fn sort_transcript(messages: &mut [ChatMessage]) {
    messages.sort_by_key(|message| message.timestamp.unwrap_or(i64::MIN));
}
