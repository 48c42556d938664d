//! SwiftGPT system prompt rendering.

use crate::context::{ContextSnapshot, is_blank};
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use swiftdesk_store::paths::day_key;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";
const NONE: &str = "(none)";

/// Render the system prompt for one chat turn.
///
/// Output depends only on `snapshot` and `today`; object keys are emitted in
/// sorted order so identical inputs always produce identical text.
pub fn build_system_prompt(snapshot: &ContextSnapshot, today: NaiveDate) -> String {
    let date = day_key(today);
    let sections = [
        build_header_section(&date),
        format!("## Memory\n\n{}", render_value(&snapshot.memory)),
        format!(
            "## Today's Log ({date})\n\n{}",
            render_bucket(&snapshot.day_log)
        ),
        format!("## Notes\n\n{}", render_notes(&snapshot.notes)),
        format!("## Calendar\n\n{}", render_value(&snapshot.calendar)),
        format!("## Reminders\n\n{}", render_value(&snapshot.reminders)),
        format!("## Calculator\n\n{}", render_value(&snapshot.calc)),
    ];
    sections.join(SECTION_SEPARATOR)
}

fn build_header_section(date: &str) -> String {
    format!(
        "# SwiftGPT\n\n\
You are SwiftGPT, the assistant inside SwiftDesk. Answer the user directly and \
use the context below when it is relevant to the question.\n\n\
## Current Date\n\
{date}\n\n\
A section without data for this user is marked as such. Do not invent entries for it."
    )
}

fn render_value(value: &Value) -> String {
    if is_blank(value) {
        return NONE.to_string();
    }
    match value {
        Value::String(text) => text.trim().to_string(),
        other => serde_json::to_string_pretty(&sorted(other)).unwrap_or_else(|_| other.to_string()),
    }
}

/// Notes grouped by day, oldest day first.
fn render_notes(notes: &Value) -> String {
    let Some(days) = notes.as_object().filter(|days| !days.is_empty()) else {
        return render_value(notes);
    };
    let mut keys: Vec<&String> = days.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|day| format!("### {day}\n{}", render_bucket(&days[day.as_str()])))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One day bucket as a bullet list ordered by timestamp, then key.
fn render_bucket(bucket: &Value) -> String {
    let Some(entries) = bucket.as_object().filter(|entries| !entries.is_empty()) else {
        return render_value(bucket);
    };
    let mut rows: Vec<(i64, &str, &Value)> = entries
        .iter()
        .map(|(id, entry)| {
            let timestamp = entry
                .get("timestamp")
                .and_then(Value::as_i64)
                .unwrap_or(i64::MIN);
            (timestamp, id.as_str(), entry)
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    rows.into_iter()
        .map(|(timestamp, _, entry)| format!("- {}", render_entry(timestamp, entry)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entry(timestamp: i64, entry: &Value) -> String {
    let content = match entry.get("content") {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string(),
        None => sorted(entry).to_string(),
    };
    match DateTime::from_timestamp_millis(timestamp).filter(|_| timestamp != i64::MIN) {
        Some(at) => format!("[{} UTC] {content}", at.format("%H:%M")),
        None => content,
    }
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
