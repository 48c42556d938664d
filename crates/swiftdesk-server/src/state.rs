//! Shared state injected into every handler.

use std::sync::Arc;
use swiftdesk_core::{ChatRelay, NotesService, SearchRelay, SimpleChatRelay, UsageTracker};

/// Services behind the HTTP endpoints.
pub struct AppState {
    pub chat: ChatRelay,
    pub simple_chat: SimpleChatRelay,
    pub search: SearchRelay,
    pub notes: NotesService,
    pub usage: Arc<UsageTracker>,
}
