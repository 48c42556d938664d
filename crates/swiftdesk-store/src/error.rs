//! Error types for store operations.

/// Errors returned by store backends and path helpers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Path or key rejected before reaching the backend.
    #[error("invalid store path: {0}")]
    InvalidPath(String),
    /// Database base URL could not be used to address nodes.
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
    /// Network failure talking to the backend.
    #[error("transport error: {0}")]
    Transport(String),
    /// Backend answered with a non-success status.
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Backend answered with an unexpected body.
    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}
