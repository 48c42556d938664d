//! Test helpers shared across SwiftDesk crates.

pub mod store;
pub mod upstream;

pub use store::{FailingStore, RecordingStore};
pub use upstream::{
    FailingChatProvider, FailingSearchProvider, FixedChatProvider, RecordingChatProvider,
    RecordingSearchProvider,
};
