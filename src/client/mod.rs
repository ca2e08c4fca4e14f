//! Reply and exchange-log clients
//!
//! This module defines the [`ResponseClient`] trait used by the chat
//! controller, the reply payload parsing shared by all implementations, and
//! the reqwest-backed [`WebhookClient`].

use async_trait::async_trait;
use serde_json::Value;

pub mod webhook;

pub use webhook::WebhookClient;

/// Reply returned whenever the reply endpoint cannot produce one
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request at the moment.";

/// Fields of a JSON reply payload that may carry the reply text, in
/// priority order
pub const REPLY_FIELDS: [&str; 4] = ["output", "response", "message", "answer"];

/// Source of assistant replies
///
/// Neither operation returns an error: `fetch_reply` degrades to
/// [`FALLBACK_REPLY`] and `report_exchange` only logs failures.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use hookchat::client::ResponseClient;
///
/// struct Echo;
///
/// #[async_trait]
/// impl ResponseClient for Echo {
///     async fn fetch_reply(&self, message: &str, _session_id: &str) -> String {
///         message.to_string()
///     }
///
///     async fn report_exchange(&self, _message: &str, _reply: &str, _session_id: &str) {}
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseClient: Send + Sync {
    /// Obtain the assistant reply for `message` sent in `session_id`
    async fn fetch_reply(&self, message: &str, session_id: &str) -> String;

    /// Record a completed exchange; failures are logged and swallowed
    async fn report_exchange(&self, message: &str, reply: &str, session_id: &str);
}

/// Pick the reply text out of a raw response body
///
/// A JSON object yields the first truthy field named in [`REPLY_FIELDS`];
/// string fields are returned as-is and other values as JSON text. Anything
/// else (plain text, other JSON shapes, no truthy field) yields the raw body.
///
/// # Examples
///
/// ```
/// use hookchat::client::extract_reply;
///
/// assert_eq!(extract_reply(r#"{"output":"Hi there"}"#), "Hi there");
/// assert_eq!(extract_reply("plain text"), "plain text");
/// ```
pub fn extract_reply(raw: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return raw.to_string();
    };

    REPLY_FIELDS
        .iter()
        .filter_map(|field| value.get(*field))
        .find(|candidate| is_truthy(candidate))
        .map(|candidate| match candidate {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| raw.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
