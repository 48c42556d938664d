use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use swiftdesk_core::{
    ChatRelay, ContextAggregator, InMemoryUsageStorage, RateTable, RelayError, RelaySettings,
    SearchRelay, SimpleChatRelay, UsageTracker,
};
use swiftdesk_protocol::{
    ChatMessage, ChatRelayRequest, Role, SearchRequest, SimpleChatRequest,
};
use swiftdesk_test_utils::{
    FailingChatProvider, FailingSearchProvider, FailingStore, FixedChatProvider,
    RecordingChatProvider, RecordingSearchProvider, RecordingStore,
};
use swiftdesk_upstream::UpstreamReply;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("date")
}

fn relay_with(chat: Arc<RecordingChatProvider>) -> ChatRelay {
    let aggregator = ContextAggregator::new(Arc::new(RecordingStore::new()));
    ChatRelay::new(aggregator, chat, RelaySettings::default())
}

fn request(uid: &str, messages: Vec<ChatMessage>) -> ChatRelayRequest {
    ChatRelayRequest {
        messages,
        uid: uid.to_string(),
        model: None,
        temperature: None,
    }
}

#[tokio::test]
async fn missing_uid_or_messages_is_a_validation_error() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::new("hello")));
    let relay = relay_with(chat.clone());

    let err = relay
        .handle_on(request("", vec![ChatMessage::user("hi")]), day())
        .await
        .expect_err("uid");
    assert!(matches!(&err, RelayError::Validation(message) if message == "Missing uid"));
    assert_eq!(err.status(), 400);

    let err = relay
        .handle_on(request("u1", Vec::new()), day())
        .await
        .expect_err("messages");
    assert!(matches!(&err, RelayError::Validation(message) if message == "Missing messages"));

    assert!(chat.requests().is_empty());
}

#[tokio::test]
async fn uid_that_is_not_a_store_key_is_a_validation_error() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::new("hello")));
    let store = Arc::new(RecordingStore::new());
    let relay = ChatRelay::new(
        ContextAggregator::new(store.clone()),
        chat.clone(),
        RelaySettings::default(),
    );

    let err = relay
        .handle_on(request("jane.doe", vec![ChatMessage::user("hi")]), day())
        .await
        .expect_err("uid");
    assert_eq!(err.status(), 400);
    assert_eq!(err.to_string(), "Invalid uid: key contains '.': jane.doe");
    assert!(store.calls().is_empty());
    assert!(chat.requests().is_empty());
}

#[tokio::test]
async fn empty_context_and_fixed_upstream_relay_choices_verbatim() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::new("hello")));
    let relay = relay_with(chat.clone());

    let envelope = relay
        .handle_on(request("u1", vec![ChatMessage::user("hi")]), day())
        .await
        .expect("envelope");

    assert_eq!(
        serde_json::to_value(&envelope).expect("serialize"),
        json!({ "choices": [{ "message": { "content": "hello" } }] })
    );
    let sent = chat.last_request().expect("request");
    assert_eq!(sent.model, "gpt-4o");
    assert_eq!(sent.temperature, Some(0.7));
    assert_eq!(sent.messages.len(), 2);
    assert_eq!(sent.messages[0].role, Role::System);
    assert!(sent.messages[0].content.contains("2024-05-01"));
    assert_eq!(sent.messages[1], ChatMessage::user("hi"));
}

#[tokio::test]
async fn upstream_never_sees_more_than_system_plus_five() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::new("ok")));
    let relay = relay_with(chat.clone());

    for supplied in [1_usize, 5, 6, 12] {
        let messages = (0..supplied)
            .map(|i| ChatMessage::user(format!("m{i}")).at(i as i64))
            .collect();
        relay
            .handle_on(request("u1", messages), day())
            .await
            .expect("envelope");
        let sent = chat.last_request().expect("request");
        assert_eq!(sent.messages.len(), 1 + supplied.min(5));
        assert_eq!(
            sent.messages.last().map(|m| m.content.clone()),
            Some(format!("m{}", supplied - 1))
        );
        assert!(sent.messages.iter().all(|m| m.timestamp.is_none()));
    }
}

#[tokio::test]
async fn request_model_and_temperature_override_defaults() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::new("ok")));
    let relay = relay_with(chat.clone());
    let mut req = request("u1", vec![ChatMessage::user("hi")]);
    req.model = Some("gpt-4-turbo".to_string());
    req.temperature = Some(0.1);

    relay.handle_on(req, day()).await.expect("envelope");
    let sent = chat.last_request().expect("request");
    assert_eq!(sent.model, "gpt-4-turbo");
    assert_eq!(sent.temperature, Some(0.1));
}

#[tokio::test]
async fn context_failure_is_an_upstream_error() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::new("ok")));
    let aggregator = ContextAggregator::new(Arc::new(FailingStore::for_prefix("notes")));
    let relay = ChatRelay::new(aggregator, chat.clone(), RelaySettings::default());

    let err = relay
        .handle_on(request("u1", vec![ChatMessage::user("hi")]), day())
        .await
        .expect_err("store");
    assert_eq!(err.status(), 500);
    assert!(err.to_string().contains("store unavailable"));
    assert!(chat.requests().is_empty());
}

#[tokio::test]
async fn upstream_failures_become_upstream_errors() {
    let aggregator = ContextAggregator::new(Arc::new(RecordingStore::new()));
    let unreachable = ChatRelay::new(
        aggregator.clone(),
        Arc::new(FailingChatProvider),
        RelaySettings::default(),
    );
    let err = unreachable
        .handle_on(request("u1", vec![ChatMessage::user("hi")]), day())
        .await
        .expect_err("transport");
    assert!(matches!(err, RelayError::Upstream(_)));

    let rejected = ChatRelay::new(
        aggregator.clone(),
        Arc::new(FixedChatProvider::with_reply(UpstreamReply::new(
            429,
            json!({ "error": { "message": "rate limited" } }),
        ))),
        RelaySettings::default(),
    );
    let err = rejected
        .handle_on(request("u1", vec![ChatMessage::user("hi")]), day())
        .await
        .expect_err("status");
    assert!(err.to_string().contains("rate limited"));

    let shapeless = ChatRelay::new(
        aggregator,
        Arc::new(FixedChatProvider::with_body(json!({ "id": "x" }))),
        RelaySettings::default(),
    );
    let err = shapeless
        .handle_on(request("u1", vec![ChatMessage::user("hi")]), day())
        .await
        .expect_err("no choices");
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn successful_reply_records_token_usage() {
    let storage = Arc::new(InMemoryUsageStorage::new());
    let tracker = Arc::new(UsageTracker::new(storage, RateTable::builtin()));
    let chat = Arc::new(FixedChatProvider::with_body(json!({
        "choices": [{ "message": { "content": "hi" } }],
        "usage": { "total_tokens": 1500 },
    })));
    let relay = ChatRelay::new(
        ContextAggregator::new(Arc::new(RecordingStore::new())),
        chat,
        RelaySettings::default(),
    )
    .with_usage(tracker.clone());

    let mut req = request("u1", vec![ChatMessage::user("hi")]);
    req.model = Some("gpt-4".to_string());
    relay.handle_on(req, day()).await.expect("envelope");

    let stats = tracker.get_stats();
    assert_eq!(stats.model, "gpt-4");
    assert_eq!(stats.total, 1500);
}

#[tokio::test]
async fn simple_chat_requires_prompt_and_relays_reply() {
    let chat = Arc::new(RecordingChatProvider::new(FixedChatProvider::with_reply(
        UpstreamReply::new(401, json!({ "error": "bad key" })),
    )));
    let relay = SimpleChatRelay::new(chat.clone(), "gpt-4o");

    let err = relay
        .handle(SimpleChatRequest { prompt: None })
        .await
        .expect_err("prompt");
    assert_eq!(err.to_string(), "Missing prompt");

    let reply = relay
        .handle(SimpleChatRequest {
            prompt: Some("hello".to_string()),
        })
        .await
        .expect("reply");
    assert_eq!(reply.status, 401);
    assert_eq!(reply.body, json!({ "error": "bad key" }));
    let sent = chat.last_request().expect("request");
    assert_eq!(sent.messages, vec![ChatMessage::user("hello")]);
    assert_eq!(sent.temperature, None);

    let unreachable = SimpleChatRelay::new(Arc::new(FailingChatProvider), "gpt-4o");
    let err = unreachable
        .handle(SimpleChatRequest {
            prompt: Some("hello".to_string()),
        })
        .await
        .expect_err("transport");
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn search_requires_q_and_applies_count_default() {
    let search = Arc::new(RecordingSearchProvider::new(UpstreamReply::new(
        200,
        json!({ "web": { "results": [] } }),
    )));
    let relay = SearchRelay::new(search.clone(), 5);

    let err = relay
        .handle(SearchRequest { q: Some(" ".to_string()), count: None })
        .await
        .expect_err("q");
    assert_eq!(err.to_string(), "Missing q");

    relay
        .handle(SearchRequest { q: Some("rust".to_string()), count: None })
        .await
        .expect("reply");
    assert_eq!(search.last_query(), Some(("rust".to_string(), 5)));

    relay
        .handle(SearchRequest { q: Some("rust".to_string()), count: Some(100) })
        .await
        .expect("reply");
    assert_eq!(search.last_query(), Some(("rust".to_string(), 20)));

    let unreachable = SearchRelay::new(Arc::new(FailingSearchProvider), 5);
    let err = unreachable
        .handle(SearchRequest { q: Some("rust".to_string()), count: None })
        .await
        .expect_err("transport");
    assert_eq!(err.status(), 500);
}
