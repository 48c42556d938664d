//! Remote store gateway for SwiftDesk.
//!
//! Every read and write of the key-path document store goes through the
//! [`RemoteStore`] trait; backends are interchangeable.

pub mod error;
pub mod firebase;
pub mod ids;
pub mod path;
pub mod paths;
pub mod provider;
mod tree;

/// Store error type.
pub use error::StoreError;
/// Firebase Realtime Database REST backend.
pub use firebase::FirebaseStore;
/// Push id generation.
pub use ids::next_push_id;
/// Validated store paths.
pub use path::StorePath;
/// Logical per-user slices.
pub use paths::UserSlice;
/// Store interface and local implementations.
pub use provider::{FileStore, InMemoryStore, RemoteStore, empty_node};
