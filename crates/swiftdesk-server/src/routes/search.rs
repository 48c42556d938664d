//! `GET|POST /api/search`.

use super::passthrough;
use crate::error::ErrorReply;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use swiftdesk_protocol::SearchRequest;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search_query).post(search_body))
}

async fn search_query(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Response, ErrorReply> {
    let Query(request) = query.map_err(|rejection| ErrorReply::bad_request(rejection.body_text()))?;
    run(&state, request).await
}

async fn search_body(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Response, ErrorReply> {
    let Json(request) = payload.map_err(|rejection| ErrorReply::bad_request(rejection.body_text()))?;
    run(&state, request).await
}

async fn run(state: &AppState, request: SearchRequest) -> Result<Response, ErrorReply> {
    let reply = state.search.handle(request).await?;
    if !reply.is_success() {
        let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(ErrorReply::new(status, reply.error_message()));
    }
    Ok(passthrough(reply))
}
