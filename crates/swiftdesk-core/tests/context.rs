use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use swiftdesk_core::{ContextAggregator, ContextSnapshot};
use swiftdesk_store::StoreError;
use swiftdesk_test_utils::{FailingStore, RecordingStore};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("date")
}

#[tokio::test]
async fn blank_uid_returns_empty_snapshot_without_store_calls() {
    let store = Arc::new(RecordingStore::new());
    let aggregator = ContextAggregator::new(store.clone());

    for uid in ["", "   "] {
        let snapshot = aggregator
            .get_all_context_on(uid, day())
            .await
            .expect("snapshot");
        assert_eq!(snapshot, ContextSnapshot::empty());
    }
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn reads_every_slice_and_picks_today_from_notes() {
    let store = Arc::new(RecordingStore::with_root(json!({
        "users": {
            "u1": {
                "memory": "Likes tea.",
                "calendar": { "e1": { "title": "standup" } },
                "reminders": { "r1": "call bob" },
                "calculator": { "last": 42 },
            }
        },
        "notes": {
            "u1": {
                "2024-04-30": { "n0": { "content": "old", "timestamp": 1 } },
                "2024-05-01": { "n1": { "content": "today", "timestamp": 2 } },
            }
        }
    })));
    let aggregator = ContextAggregator::new(store.clone());

    let snapshot = aggregator
        .get_all_context_on("u1", day())
        .await
        .expect("snapshot");

    assert_eq!(snapshot.memory, json!("Likes tea."));
    assert_eq!(snapshot.day_log, json!({ "n1": { "content": "today", "timestamp": 2 } }));
    assert_eq!(snapshot.notes.as_object().map(|days| days.len()), Some(2));
    assert_eq!(snapshot.calendar["e1"]["title"], "standup");
    assert_eq!(snapshot.reminders, json!({ "r1": "call bob" }));
    assert_eq!(snapshot.calc, json!({ "last": 42 }));

    let mut calls = store.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "fetch:notes/u1",
            "fetch:users/u1/calculator",
            "fetch:users/u1/calendar",
            "fetch:users/u1/memory",
            "fetch:users/u1/reminders",
        ]
    );
}

#[tokio::test]
async fn unknown_user_yields_empty_slices() {
    let aggregator = ContextAggregator::new(Arc::new(RecordingStore::new()));
    let snapshot = aggregator
        .get_all_context_on("nobody", day())
        .await
        .expect("snapshot");
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.day_log, json!({}));
}

#[tokio::test]
async fn one_failing_slice_fails_the_aggregation() {
    let aggregator = ContextAggregator::new(Arc::new(FailingStore::for_prefix("users/u1/reminders")));
    let err = aggregator
        .get_all_context_on("u1", day())
        .await
        .expect_err("aggregation should fail");
    assert!(matches!(err, StoreError::Transport(_)));
}
