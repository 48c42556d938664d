//! Router assembly.

mod chat;
mod health;
mod notes;
mod search;
mod usage;

use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use swiftdesk_upstream::UpstreamReply;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .nest(
            "/api",
            Router::new()
                .merge(chat::router())
                .merge(search::router())
                .merge(notes::router())
                .merge(usage::router()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Upstream status and body passed through. JSON bodies are re-serialized;
/// any other body goes back as received, under the upstream content type.
fn passthrough(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    match reply.raw {
        Some(raw) => {
            let content_type = raw
                .content_type
                .unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
            (status, [(header::CONTENT_TYPE, content_type)], raw.text).into_response()
        }
        None => (status, Json(reply.body)).into_response(),
    }
}
