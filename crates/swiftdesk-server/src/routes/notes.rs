//! `POST /api/notes` and `GET /api/notes/{uid}/{date}`.

use crate::error::ErrorReply;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use swiftdesk_core::parse_day;
use swiftdesk_protocol::{NoteCreated, NoteList, NoteRequest};

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notes", post(add_note))
        .route("/notes/{uid}/{date}", get(list_notes))
}

async fn add_note(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteCreated>), ErrorReply> {
    let Json(request) = payload.map_err(|rejection| ErrorReply::bad_request(rejection.body_text()))?;
    let created = state.notes.add_note(&request.uid, &request.content).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path((uid, date)): Path<(String, String)>,
) -> Result<Json<NoteList>, ErrorReply> {
    let date = parse_day(&date)?;
    Ok(Json(state.notes.notes_for_day(&uid, date).await?))
}
