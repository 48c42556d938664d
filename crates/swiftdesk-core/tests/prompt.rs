use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use swiftdesk_core::{ContextSnapshot, build_system_prompt};

fn populated() -> ContextSnapshot {
    ContextSnapshot {
        memory: json!({ "prefs": { "tone": "brief", "lang": "en" } }),
        day_log: json!({ "n2": { "content": "standup done", "timestamp": 1714546800000_i64 } }),
        notes: json!({
            "2024-05-01": { "n2": { "content": "standup done", "timestamp": 1714546800000_i64 } },
            "2024-04-29": { "n1": { "content": "draft plan", "timestamp": 1714377600000_i64 } },
        }),
        calendar: json!({ "e1": { "title": "1:1", "at": "2024-05-01T15:00:00Z" } }),
        reminders: json!(["renew domain"]),
        calc: json!({ "expression": "2+2", "result": 4 }),
    }
}

#[test]
fn identical_inputs_render_identical_prompts() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let first = build_system_prompt(&populated(), day);
    let second = build_system_prompt(&populated().clone(), day);
    assert_eq!(first, second);
}

#[test]
fn every_slice_and_the_date_are_embedded() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
    let prompt = build_system_prompt(&populated(), day);

    for needle in [
        "2024-05-01",
        "\"tone\": \"brief\"",
        "## Today's Log (2024-05-01)\n\n- [07:00 UTC] standup done",
        "1:1",
        "renew domain",
        "\"result\": 4",
    ] {
        assert!(prompt.contains(needle), "missing {needle:?} in\n{prompt}");
    }
    assert!(!prompt.contains("(none)"));

    let older = prompt.find("### 2024-04-29").expect("older day");
    let newer = prompt.find("### 2024-05-01").expect("newer day");
    assert!(older < newer);
}
