//! Chat and search relays in front of the upstream APIs.

use crate::context::{ContextAggregator, checked_uid};
use crate::prompt::build_system_prompt;
use crate::usage::UsageTracker;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;
use swiftdesk_config::SwiftDeskConfig;
use swiftdesk_protocol::{
    ChatMessage, ChatRelayRequest, ChoicesEnvelope, Role, SearchRequest, SimpleChatRequest,
    sort_transcript,
};
use swiftdesk_store::StoreError;
use swiftdesk_upstream::{
    ChatCompletionProvider, ChatCompletionRequest, SearchProvider, UpstreamError, UpstreamReply,
};
use thiserror::Error;

/// Upper bound accepted by the search API for one page.
const MAX_SEARCH_COUNT: u32 = 20;

/// Relay failure. Validation maps to 400, everything else to 500.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A request field is missing or unusable.
    #[error("{0}")]
    Validation(String),
    /// Store read, upstream transport, or upstream reply failure.
    #[error("{0}")]
    Upstream(String),
}

impl RelayError {
    /// HTTP status for the error kind.
    pub fn status(&self) -> u16 {
        match self {
            RelayError::Validation(_) => 400,
            RelayError::Upstream(_) => 500,
        }
    }
}

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPath(detail) => {
                RelayError::Validation(format!("Invalid store path: {detail}"))
            }
            other => RelayError::Upstream(other.to_string()),
        }
    }
}

impl From<UpstreamError> for RelayError {
    fn from(err: UpstreamError) -> Self {
        RelayError::Upstream(err.to_string())
    }
}

/// Defaults applied to relay requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub default_model: String,
    pub default_temperature: f64,
    /// Client messages forwarded after the system prompt.
    pub history_window: usize,
    pub search_count: u32,
}

impl RelaySettings {
    pub fn from_config(config: &SwiftDeskConfig) -> Self {
        Self {
            default_model: config.chat.default_model.clone(),
            default_temperature: config.chat.default_temperature,
            history_window: config.chat.history_window,
            search_count: config.search.default_count,
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from_config(&SwiftDeskConfig::default())
    }
}

/// Context-aware chat relay.
pub struct ChatRelay {
    aggregator: ContextAggregator,
    chat: Arc<dyn ChatCompletionProvider>,
    usage: Option<Arc<UsageTracker>>,
    settings: RelaySettings,
}

impl ChatRelay {
    pub fn new(
        aggregator: ContextAggregator,
        chat: Arc<dyn ChatCompletionProvider>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            aggregator,
            chat,
            usage: None,
            settings,
        }
    }

    /// Record upstream token usage in `tracker`.
    pub fn with_usage(mut self, tracker: Arc<UsageTracker>) -> Self {
        self.usage = Some(tracker);
        self
    }

    pub async fn handle(&self, request: ChatRelayRequest) -> Result<ChoicesEnvelope, RelayError> {
        self.handle_on(request, Utc::now().date_naive()).await
    }

    /// Relay one chat turn with `today` as the prompt date.
    pub async fn handle_on(
        &self,
        request: ChatRelayRequest,
        today: NaiveDate,
    ) -> Result<ChoicesEnvelope, RelayError> {
        let uid = checked_uid(&request.uid).map_err(RelayError::Validation)?;
        if !request
            .messages
            .iter()
            .any(|message| message.role != Role::System)
        {
            return Err(RelayError::Validation("Missing messages".to_string()));
        }

        let snapshot = self.aggregator.get_all_context_on(uid, today).await?;
        let system_prompt = build_system_prompt(&snapshot, today);
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(&self.settings.default_model)
            .to_string();
        let upstream_request = ChatCompletionRequest {
            model,
            messages: compose_messages(
                system_prompt,
                &request.messages,
                self.settings.history_window,
            ),
            temperature: Some(
                request
                    .temperature
                    .unwrap_or(self.settings.default_temperature),
            ),
        };
        debug!(
            "relaying chat (model={}, forwarded={}, supplied={})",
            upstream_request.model,
            upstream_request.messages.len() - 1,
            request.messages.len()
        );

        let reply = self.chat.complete(&upstream_request).await?;
        if !reply.is_success() {
            return Err(RelayError::Upstream(reply.error_message()));
        }
        let Some(choices) = reply.body.get("choices").and_then(Value::as_array) else {
            return Err(RelayError::Upstream(
                "upstream reply has no choices".to_string(),
            ));
        };
        let envelope = ChoicesEnvelope::new(choices.clone());
        self.record_usage(&upstream_request.model, &reply.body);
        info!(
            "chat relayed (model={}, choices={}, reply_chars={})",
            upstream_request.model,
            envelope.choices.len(),
            envelope.first_content().map(str::len).unwrap_or(0)
        );
        Ok(envelope)
    }

    fn record_usage(&self, model: &str, body: &Value) {
        let Some(tracker) = &self.usage else {
            return;
        };
        let Some(tokens) = body.pointer("/usage/total_tokens").and_then(Value::as_u64) else {
            debug!("upstream reply carried no token usage");
            return;
        };
        if let Err(err) = tracker.record(model, tokens) {
            warn!("failed to record token usage (model={model}, tokens={tokens}): {err}");
        }
    }
}

/// System prompt followed by the latest `window` non-system client messages
/// in timestamp order, stripped to role and content.
pub fn compose_messages(
    system_prompt: String,
    history: &[ChatMessage],
    window: usize,
) -> Vec<ChatMessage> {
    let mut client: Vec<ChatMessage> = history
        .iter()
        .filter(|message| message.role != Role::System)
        .cloned()
        .collect();
    sort_transcript(&mut client);
    let start = client.len().saturating_sub(window);
    std::iter::once(ChatMessage::system(system_prompt))
        .chain(client[start..].iter().map(ChatMessage::to_upstream))
        .collect()
}

/// Stateless single-prompt chat relay.
pub struct SimpleChatRelay {
    chat: Arc<dyn ChatCompletionProvider>,
    model: String,
}

impl SimpleChatRelay {
    pub fn new(chat: Arc<dyn ChatCompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    /// Forward the prompt and return the upstream reply whatever its status.
    pub async fn handle(&self, request: SimpleChatRequest) -> Result<UpstreamReply, RelayError> {
        let prompt = request
            .prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .ok_or_else(|| RelayError::Validation("Missing prompt".to_string()))?;
        let upstream_request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
        };
        let reply = self.chat.complete(&upstream_request).await?;
        debug!("simple chat relayed (status={})", reply.status);
        Ok(reply)
    }
}

/// Web search relay.
pub struct SearchRelay {
    search: Arc<dyn SearchProvider>,
    default_count: u32,
}

impl SearchRelay {
    pub fn new(search: Arc<dyn SearchProvider>, default_count: u32) -> Self {
        Self {
            search,
            default_count,
        }
    }

    /// Run the query and return the upstream reply whatever its status.
    pub async fn handle(&self, request: SearchRequest) -> Result<UpstreamReply, RelayError> {
        let query = request
            .q
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or_else(|| RelayError::Validation("Missing q".to_string()))?;
        let count = request
            .count
            .filter(|count| *count > 0)
            .unwrap_or(self.default_count)
            .clamp(1, MAX_SEARCH_COUNT);
        let reply = self.search.search(query, count).await?;
        debug!("search relayed (status={}, count={count})", reply.status);
        Ok(reply)
    }
}
