use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use swiftdesk_upstream::{
    ChatCompletionProvider, ChatCompletionRequest, SearchProvider, UpstreamError, UpstreamReply,
};

/// Chat upstream returning the same reply for every request.
#[derive(Debug, Clone)]
pub struct FixedChatProvider {
    reply: UpstreamReply,
}

impl FixedChatProvider {
    /// 200 reply with a single assistant message.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_body(json!({
            "choices": [{ "message": { "content": content.into() } }]
        }))
    }

    /// 200 reply with an arbitrary body.
    pub fn with_body(body: Value) -> Self {
        Self::with_reply(UpstreamReply::new(200, body))
    }

    pub fn with_reply(reply: UpstreamReply) -> Self {
        Self { reply }
    }
}

#[async_trait]
impl ChatCompletionProvider for FixedChatProvider {
    async fn complete(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        Ok(self.reply.clone())
    }
}

/// Chat upstream that records requests before answering like
/// [`FixedChatProvider`].
pub struct RecordingChatProvider {
    inner: FixedChatProvider,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl RecordingChatProvider {
    pub fn new(inner: FixedChatProvider) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<ChatCompletionRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ChatCompletionProvider for RecordingChatProvider {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        self.requests.lock().push(request.clone());
        self.inner.complete(request).await
    }
}

/// Chat upstream that cannot be reached.
#[derive(Debug, Clone, Default)]
pub struct FailingChatProvider;

#[async_trait]
impl ChatCompletionProvider for FailingChatProvider {
    async fn complete(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        Err(UpstreamError::Transport("connection refused".to_string()))
    }
}

/// Search upstream recording the last query and answering with a fixed reply.
pub struct RecordingSearchProvider {
    reply: UpstreamReply,
    last: Mutex<Option<(String, u32)>>,
}

impl RecordingSearchProvider {
    pub fn new(reply: UpstreamReply) -> Self {
        Self {
            reply,
            last: Mutex::new(None),
        }
    }

    pub fn last_query(&self) -> Option<(String, u32)> {
        self.last.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for RecordingSearchProvider {
    async fn search(&self, query: &str, count: u32) -> Result<UpstreamReply, UpstreamError> {
        *self.last.lock() = Some((query.to_string(), count));
        Ok(self.reply.clone())
    }
}

/// Search upstream that cannot be reached.
#[derive(Debug, Clone, Default)]
pub struct FailingSearchProvider;

#[async_trait]
impl SearchProvider for FailingSearchProvider {
    async fn search(&self, _query: &str, _count: u32) -> Result<UpstreamReply, UpstreamError> {
        Err(UpstreamError::Transport("connection refused".to_string()))
    }
}
