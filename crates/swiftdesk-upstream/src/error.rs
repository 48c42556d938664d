//! Error type for upstream calls.

use thiserror::Error;

/// Failure to obtain any reply from an upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or body read failure.
    #[error("upstream request failed: {0}")]
    Transport(String),
    /// Client could not be constructed.
    #[error("upstream client misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            UpstreamError::Config(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
