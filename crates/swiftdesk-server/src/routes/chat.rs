//! `POST /api/chat` and `POST /api/simple-chat`.

use super::passthrough;
use crate::error::{ChatFailure, ErrorReply};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use swiftdesk_core::RelayError;
use swiftdesk_protocol::{ChatRelayRequest, ChoicesEnvelope, SimpleChatRequest};

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/simple-chat", post(simple_chat))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRelayRequest>, JsonRejection>,
) -> Result<Json<ChoicesEnvelope>, ChatFailure> {
    let Json(request) =
        payload.map_err(|rejection| RelayError::Validation(rejection.body_text()))?;
    let envelope = state.chat.handle(request).await?;
    Ok(Json(envelope))
}

async fn simple_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimpleChatRequest>, JsonRejection>,
) -> Result<Response, ErrorReply> {
    let Json(request) = payload.map_err(|rejection| ErrorReply::bad_request(rejection.body_text()))?;
    let reply = state.simple_chat.handle(request).await?;
    Ok(passthrough(reply))
}
