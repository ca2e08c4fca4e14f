//! End-to-end send tests: `ChatController` + `WebhookClient` + SQLite storage
//!
//! The reply and exchange-log webhooks are served by wiremock.

mod common;

use common::{create_temp_storage, webhook_config};
use hookchat::chat::ChatController;
use hookchat::client::{WebhookClient, FALLBACK_REPLY};
use hookchat::session::{Sender, SessionStore};
use hookchat::storage::SqliteStorage;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller(
    storage: &Arc<SqliteStorage>,
    server: &MockServer,
    with_log: bool,
) -> ChatController<Arc<SqliteStorage>> {
    let mut store = SessionStore::new(Arc::clone(storage));
    store.set_identity(Some("alice".to_string())).unwrap();
    let client = WebhookClient::new(&webhook_config(&server.uri(), with_log)).unwrap();
    ChatController::new(store, Arc::new(client))
}

#[tokio::test]
async fn test_hello_round_trip_is_persisted() {
    let server = MockServer::start().await;
    let (storage, _tmp) = create_temp_storage();
    let mut chat = controller(&storage, &server, false);
    let session_id = chat.store().selected_id().unwrap().to_string();

    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .and(body_json(json!({"message": "Hello", "chatId": session_id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "Hi there"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = chat.send_message("Hello").await.unwrap();
    assert_eq!(reply.as_deref(), Some("Hi there"));

    let mut reopened = SessionStore::new(Arc::clone(&storage));
    reopened.set_identity(Some("alice".to_string())).unwrap();
    let session = reopened.selected_session().unwrap();
    assert_eq!(session.id, session_id);
    assert_eq!(session.title, "Hello");

    let messages: Vec<(Sender, &str)> = session
        .messages
        .iter()
        .map(|m| (m.sender, m.content.as_str()))
        .collect();
    assert_eq!(
        messages,
        vec![(Sender::User, "Hello"), (Sender::Assistant, "Hi there")]
    );
}

#[tokio::test]
async fn test_reply_endpoint_failure_stores_fallback() {
    let server = MockServer::start().await;
    let (storage, _tmp) = create_temp_storage();
    let mut chat = controller(&storage, &server, false);

    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reply = chat.send_message("Hello").await.unwrap();
    assert_eq!(reply.as_deref(), Some(FALLBACK_REPLY));

    let session = chat.store().selected_session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].sender, Sender::Assistant);
    assert_eq!(session.messages[1].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_exchange_is_reported_after_reply() {
    let server = MockServer::start().await;
    let (storage, _tmp) = create_temp_storage();
    let mut chat = controller(&storage, &server, true);

    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain answer"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook/log"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let pending = chat.begin_send("  What's up?  ").unwrap().unwrap();
    let reply = chat
        .client()
        .fetch_reply(&pending.content, &pending.session_id)
        .await;
    assert_eq!(reply, "plain answer");

    chat.complete_send(&pending, &reply)
        .unwrap()
        .await
        .expect("report task panicked");

    let requests = server.received_requests().await.unwrap();
    let report = requests
        .iter()
        .find(|r| r.url.path() == "/webhook/log")
        .expect("exchange report was not sent");
    let body: Value = serde_json::from_slice(&report.body).unwrap();
    assert_eq!(body["userMessage"], "What's up?");
    assert_eq!(body["assistantResponse"], "plain answer");
    assert_eq!(body["chatId"], pending.session_id.as_str());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_reply_lands_in_session_active_when_sent() {
    let server = MockServer::start().await;
    let (storage, _tmp) = create_temp_storage();
    let mut chat = controller(&storage, &server, false);
    let first = chat.store().selected_id().unwrap().to_string();

    Mock::given(method("POST"))
        .and(path("/webhook/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Later"})))
        .mount(&server)
        .await;

    let pending = chat.begin_send("First question").unwrap().unwrap();
    let second = chat.store_mut().create_session().unwrap().unwrap();
    assert_eq!(chat.store().selected_id(), Some(second.as_str()));

    let reply = chat
        .client()
        .fetch_reply(&pending.content, &pending.session_id)
        .await;
    let _report = chat.complete_send(&pending, &reply).unwrap();

    let first_session = chat.store().session(&first).unwrap();
    assert_eq!(first_session.messages.len(), 2);
    assert_eq!(first_session.messages[1].content, "Later");
    assert!(chat.store().session(&second).unwrap().messages.is_empty());
}
