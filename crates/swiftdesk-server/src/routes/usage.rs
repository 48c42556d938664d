use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use swiftdesk_protocol::UsageStats;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new().route("/usage", get(usage))
}

async fn usage(State(state): State<Arc<AppState>>) -> Json<UsageStats> {
    Json(state.usage.get_stats())
}
