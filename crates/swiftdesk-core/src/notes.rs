//! Date-bucketed user notes.

use crate::context::checked_uid;
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use serde_json::{Value, json};
use std::sync::Arc;
use swiftdesk_protocol::{NoteCreated, NoteEntry, NoteList};
use swiftdesk_store::RemoteStore;
use swiftdesk_store::paths::{self, day_key};

/// Appends and lists notes under `notes/{uid}/{YYYY-MM-DD}`.
#[derive(Clone)]
pub struct NotesService {
    store: Arc<dyn RemoteStore>,
}

impl NotesService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Append a note to today's bucket (UTC).
    pub async fn add_note(&self, uid: &str, content: &str) -> Result<NoteCreated, CoreError> {
        self.add_note_at(uid, content, Utc::now()).await
    }

    /// Append a note stamped with `now`; the bucket is `now`'s UTC date.
    pub async fn add_note_at(
        &self,
        uid: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<NoteCreated, CoreError> {
        let uid = checked_uid(uid).map_err(CoreError::Validation)?;
        let content = required(content, "Missing content")?;
        let date = now.date_naive();
        let bucket = paths::notes_day(uid, date)?;
        let id = self
            .store
            .append_node(
                &bucket,
                json!({ "content": content, "timestamp": now.timestamp_millis() }),
            )
            .await?;
        info!("note appended (bucket={bucket}, id={id})");
        Ok(NoteCreated {
            date: day_key(date),
            id,
        })
    }

    /// Notes of one day, oldest first. Entries without text content are
    /// skipped.
    pub async fn notes_for_day(&self, uid: &str, date: NaiveDate) -> Result<NoteList, CoreError> {
        let uid = checked_uid(uid).map_err(CoreError::Validation)?;
        let bucket = self.store.fetch_node(&paths::notes_day(uid, date)?).await?;
        let mut notes: Vec<NoteEntry> = bucket
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(id, entry)| {
                let content = entry.get("content").and_then(Value::as_str);
                if content.is_none() {
                    debug!("skipping malformed note entry (id={id})");
                }
                Some(NoteEntry {
                    id: id.clone(),
                    content: content?.to_string(),
                    timestamp: entry.get("timestamp").and_then(Value::as_i64).unwrap_or(0),
                })
            })
            .collect();
        notes.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(NoteList {
            uid: uid.to_string(),
            date: day_key(date),
            notes,
        })
    }
}

/// Parse a `YYYY-MM-DD` day key.
pub fn parse_day(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| CoreError::Validation(format!("Invalid date {raw:?}: {err}")))
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(message.to_string()));
    }
    Ok(trimmed)
}
