use std::fmt;

/// Keys stored per identity
///
/// Every identity owns exactly these two entries, so switching identities
/// never exposes another user's sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// JSON array of every session, head first
    Chats,
    /// Plain-text id of the selected session
    SelectedChatId,
}

impl StorageKey {
    /// Name of the key as written to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Chats => "chats",
            StorageKey::SelectedChatId => "selected_chat_id",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
