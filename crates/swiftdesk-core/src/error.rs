//! Error types for the core services.

use swiftdesk_store::StoreError;
use thiserror::Error;

/// Errors returned by the notes service. A key the store rejects is the
/// caller's input problem and surfaces as `Validation`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller input was rejected before touching the store.
    #[error("{0}")]
    Validation(String),
    /// Remote store failure.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPath(detail) => {
                CoreError::Validation(format!("Invalid store path: {detail}"))
            }
            other => CoreError::Store(other),
        }
    }
}
