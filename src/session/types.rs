//! Session and message types
//!
//! Both types serialize with camelCase keys; a stored chat list is a JSON
//! array of `{id, title, lastMessage, timestamp, messages}` objects.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Title given to every new session until a message or rename replaces it
pub const DEFAULT_TITLE: &str = "New Chat";

/// Preview shown for a session with no messages yet
pub const EMPTY_PREVIEW: &str = "Start a new conversation";

/// Maximum characters kept when deriving a title from a user message
pub const TITLE_MAX_CHARS: usize = 30;

/// Maximum characters kept in the preview of an assistant reply
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Marker appended to shortened text
pub const ELLIPSIS: &str = "…";

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: String,
}

/// A chat conversation owned by one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// Create an empty session with the default title
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            last_message: EMPTY_PREVIEW.to_string(),
            timestamp: timestamp.into(),
            messages: Vec::new(),
        }
    }

    /// Whether the title has never been derived or renamed
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Append a user message, refreshing the preview and deriving the
    /// title while it is still the default
    pub fn push_user(&mut self, message: Message) {
        if self.has_default_title() {
            self.title = derive_title(&message.content);
        }
        self.last_message = message.content.clone();
        self.timestamp = message.timestamp.clone();
        self.messages.push(message);
    }

    /// Append an assistant message, refreshing the preview
    pub fn push_assistant(&mut self, message: Message) {
        // The ellipsis is appended even when nothing was cut.
        self.last_message = format!(
            "{}{}",
            take_chars(&message.content, PREVIEW_MAX_CHARS),
            ELLIPSIS
        );
        self.timestamp = message.timestamp.clone();
        self.messages.push(message);
    }
}

/// Title derived from the first user message of a session
///
/// # Examples
///
/// ```
/// use hookchat::session::derive_title;
///
/// assert_eq!(derive_title("Hello"), "Hello");
/// assert_eq!(
///     derive_title("abcdefghijklmnopqrstuvwxyz0123456789"),
///     "abcdefghijklmnopqrstuvwxyz0123…"
/// );
/// ```
pub fn derive_title(content: &str) -> String {
    if content.chars().count() > TITLE_MAX_CHARS {
        format!("{}{}", take_chars(content, TITLE_MAX_CHARS), ELLIPSIS)
    } else {
        content.to_string()
    }
}

fn take_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Hour and minute of `instant` in local time, e.g. `"09:41"`
pub fn time_of_day(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M").to_string()
}

/// Issues millisecond-instant identifiers
///
/// Two ids requested within the same millisecond (or after the wall clock
/// steps backwards) are offset by one unit from the previous id.
#[derive(Debug, Default)]
pub struct IdClock {
    last: i64,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for the given instant
    pub fn next_at(&mut self, instant: DateTime<Utc>) -> String {
        let millis = instant
            .timestamp_millis()
            .max(self.last.saturating_add(1));
        self.last = millis;
        millis.to_string()
    }

    /// Record ids already in use so new ones never collide with them
    ///
    /// Ids that are not representable millisecond instants are ignored;
    /// they cannot collide with an id issued from a real clock reading.
    pub fn observe(&mut self, id: &str) {
        let Ok(millis) = id.parse::<i64>() else {
            return;
        };
        if DateTime::<Utc>::from_timestamp_millis(millis).is_some() {
            self.last = self.last.max(millis);
        }
    }
}
