//! Core services behind the SwiftDesk backend.
//!
//! This crate gathers per-user context from the remote store, renders it into
//! the SwiftGPT system prompt, relays chat and search requests upstream, and
//! keeps the running token usage estimate.

pub mod context;
pub mod error;
pub mod notes;
pub mod prompt;
pub mod relay;
pub mod usage;

pub use context::{ContextAggregator, ContextSnapshot};
pub use error::CoreError;
pub use notes::{NotesService, parse_day};
pub use prompt::build_system_prompt;
/// Chat and search relays.
pub use relay::{ChatRelay, RelayError, RelaySettings, SearchRelay, SimpleChatRelay};
/// Token usage accounting.
pub use usage::{
    FileUsageStorage, InMemoryUsageStorage, RateTable, UsageError, UsageObserver, UsageStorage,
    UsageTracker, default_usage_path,
};
