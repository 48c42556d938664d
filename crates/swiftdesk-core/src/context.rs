//! Per-user context gathered before every chat relay call.

use chrono::{NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use swiftdesk_store::path::validate_key;
use swiftdesk_store::paths::{self, day_key};
use swiftdesk_store::{RemoteStore, StoreError, UserSlice, empty_node};

/// Everything the assistant may know about a user at request time.
///
/// Slices missing from the store are empty JSON objects, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// `users/{uid}/memory`
    pub memory: Value,
    /// Today's bucket of `notes/{uid}`.
    pub day_log: Value,
    /// Every day bucket of `notes/{uid}`.
    pub notes: Value,
    /// `users/{uid}/calendar`
    pub calendar: Value,
    /// `users/{uid}/reminders`
    pub reminders: Value,
    /// `users/{uid}/calculator`
    pub calc: Value,
}

impl ContextSnapshot {
    /// Snapshot with every slice empty.
    pub fn empty() -> Self {
        Self {
            memory: empty_node(),
            day_log: empty_node(),
            notes: empty_node(),
            calendar: empty_node(),
            reminders: empty_node(),
            calc: empty_node(),
        }
    }

    /// True when no slice carries data.
    pub fn is_empty(&self) -> bool {
        [
            &self.memory,
            &self.day_log,
            &self.notes,
            &self.calendar,
            &self.reminders,
            &self.calc,
        ]
        .into_iter()
        .all(is_blank)
    }
}

impl Default for ContextSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reads the context slices of one user from the remote store.
#[derive(Clone)]
pub struct ContextAggregator {
    store: Arc<dyn RemoteStore>,
}

impl ContextAggregator {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Gather the snapshot for `uid`, picking today's log by the current
    /// UTC date.
    pub async fn get_all_context(&self, uid: &str) -> Result<ContextSnapshot, StoreError> {
        self.get_all_context_on(uid, Utc::now().date_naive()).await
    }

    /// Gather the snapshot for `uid` with `today` selecting the day log.
    ///
    /// A blank uid yields the empty snapshot without contacting the store.
    /// The slice reads run concurrently and any failure fails the whole
    /// aggregation.
    pub async fn get_all_context_on(
        &self,
        uid: &str,
        today: NaiveDate,
    ) -> Result<ContextSnapshot, StoreError> {
        let uid = uid.trim();
        if uid.is_empty() {
            debug!("context requested without uid; returning empty snapshot");
            return Ok(ContextSnapshot::empty());
        }

        let memory_path = paths::user_slice(uid, UserSlice::Memory)?;
        let notes_path = paths::notes(uid)?;
        let calendar_path = paths::user_slice(uid, UserSlice::Calendar)?;
        let reminders_path = paths::user_slice(uid, UserSlice::Reminders)?;
        let calc_path = paths::user_slice(uid, UserSlice::Calculator)?;

        let (memory, notes, calendar, reminders, calc) = tokio::try_join!(
            self.store.fetch_node(&memory_path),
            self.store.fetch_node(&notes_path),
            self.store.fetch_node(&calendar_path),
            self.store.fetch_node(&reminders_path),
            self.store.fetch_node(&calc_path),
        )?;

        let day_log = notes
            .get(day_key(today))
            .filter(|bucket| !bucket.is_null())
            .cloned()
            .unwrap_or_else(empty_node);

        let snapshot = ContextSnapshot {
            memory: or_empty(memory),
            day_log,
            notes: or_empty(notes),
            calendar: or_empty(calendar),
            reminders: or_empty(reminders),
            calc: or_empty(calc),
        };
        info!(
            "context aggregated (uid_len={}, note_days={}, empty={})",
            uid.len(),
            snapshot.notes.as_object().map(|days| days.len()).unwrap_or(0),
            snapshot.is_empty()
        );
        Ok(snapshot)
    }
}

/// Trimmed uid, or the validation message for a blank uid or one the store
/// cannot use as a key.
pub(crate) fn checked_uid(raw: &str) -> Result<&str, String> {
    let uid = raw.trim();
    if uid.is_empty() {
        return Err("Missing uid".to_string());
    }
    validate_key(uid).map_err(|err| match err {
        StoreError::InvalidPath(detail) => format!("Invalid uid: {detail}"),
        other => other.to_string(),
    })?;
    Ok(uid)
}

fn or_empty(value: Value) -> Value {
    if value.is_null() { empty_node() } else { value }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}
