//! Failure envelopes.
//!
//! The chat relay answers failures in the same `{choices: [...]}` shape as
//! its successes; every other endpoint answers `{error: "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use swiftdesk_core::{CoreError, RelayError};
use swiftdesk_protocol::{ChoicesEnvelope, ErrorBody};

/// Chat relay failure rendered as an assistant message.
#[derive(Debug)]
pub struct ChatFailure(pub RelayError);

impl From<RelayError> for ChatFailure {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ChatFailure {
    fn into_response(self) -> Response {
        let (status, content) = match &self.0 {
            RelayError::Validation(message) => {
                warn!("chat relay rejected request: {message}");
                (StatusCode::BAD_REQUEST, message.clone())
            }
            RelayError::Upstream(message) => {
                error!("chat relay failed: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {message}"))
            }
        };
        (status, Json(ChoicesEnvelope::assistant_text(content))).into_response()
    }
}

/// `{error}` reply with an explicit status.
#[derive(Debug)]
pub struct ErrorReply {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorReply {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<RelayError> for ErrorReply {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Validation(message) => Self::bad_request(message),
            RelayError::Upstream(message) => Self::internal(message),
        }
    }
}

impl From<CoreError> for ErrorReply {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => Self::bad_request(message),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("request failed (status={}): {}", self.status, self.message);
        } else {
            warn!("request rejected (status={}): {}", self.status, self.message);
        }
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}
