use crate::error::{HookchatError, Result};
use crate::session::types::{time_of_day, IdClock, Message, Sender, Session};
use crate::storage::{KeyValueStore, StorageKey};
use chrono::Utc;
use std::collections::HashSet;

/// Ordered session list and selection for the signed-in identity
///
/// Every mutation that changes the list or a session is written through to
/// the storage collaborator before the call returns. Without an identity the
/// store stays empty and mutations are no-ops.
///
/// # Examples
///
/// ```
/// use hookchat::session::SessionStore;
/// use hookchat::storage::MemoryStorage;
///
/// # fn main() -> hookchat::error::Result<()> {
/// let mut store = SessionStore::new(MemoryStorage::new());
/// store.set_identity(Some("alice".to_string()))?;
///
/// let id = store.create_session()?.expect("identity is set");
/// store.append_user_message(&id, "Hello")?;
/// assert_eq!(store.session(&id).unwrap().title, "Hello");
/// # Ok(())
/// # }
/// ```
pub struct SessionStore<S: KeyValueStore> {
    storage: S,
    identity: Option<String>,
    sessions: Vec<Session>,
    selected: Option<String>,
    ids: IdClock,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create an empty store with no identity
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            identity: None,
            sessions: Vec::new(),
            selected: None,
            ids: IdClock::new(),
        }
    }

    /// Storage collaborator backing this store
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Identity whose sessions are loaded
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Sessions, most recently created first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Id of the selected session
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected session, if the selection names a listed session
    pub fn selected_session(&self) -> Option<&Session> {
        self.selected.as_deref().and_then(|id| self.session(id))
    }

    /// Look up a session by id
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Switch to another identity (or to none)
    ///
    /// In-memory state is discarded and reloaded from the new identity's
    /// storage keys. Missing or malformed stored data starts the identity
    /// with one fresh session.
    pub fn set_identity(&mut self, identity: Option<String>) -> Result<()> {
        self.sessions.clear();
        self.selected = None;
        self.identity = identity;

        let Some(identity) = self.identity.clone() else {
            tracing::debug!("Identity cleared, session list emptied");
            return Ok(());
        };

        let stored_chats = self.storage.get(&identity, StorageKey::Chats)?;
        let stored_selected = self.storage.get(&identity, StorageKey::SelectedChatId)?;

        let Some(raw) = stored_chats else {
            tracing::debug!(identity = %identity, "No stored sessions, starting fresh");
            self.create_session()?;
            return Ok(());
        };

        let sessions = match serde_json::from_str::<Vec<Session>>(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!(identity = %identity, "Error parsing saved sessions: {}", e);
                self.create_session()?;
                return Ok(());
            }
        };

        let mut seen = HashSet::new();
        for session in sessions {
            if !seen.insert(session.id.clone()) {
                tracing::warn!(session_id = %session.id, "Dropping duplicate stored session");
                continue;
            }
            self.ids.observe(&session.id);
            for message in &session.messages {
                self.ids.observe(&message.id);
            }
            self.sessions.push(session);
        }

        match stored_selected {
            Some(id) if self.session(&id).is_some() => {
                self.selected = Some(id);
            }
            _ => match self.sessions.first() {
                Some(head) => {
                    self.selected = Some(head.id.clone());
                    self.persist_selection()?;
                }
                None => {
                    self.create_session()?;
                }
            },
        }

        tracing::info!(
            identity = %identity,
            sessions = self.sessions.len(),
            "Loaded stored sessions"
        );
        Ok(())
    }

    /// Insert a new empty session at the head of the list and select it
    ///
    /// Returns the new session id, or `None` when no identity is set.
    pub fn create_session(&mut self) -> Result<Option<String>> {
        if self.identity.is_none() {
            tracing::debug!("create_session ignored without an identity");
            return Ok(None);
        }

        let now = Utc::now();
        let id = self.ids.next_at(now);
        self.sessions.insert(0, Session::new(id.clone(), time_of_day(now)));
        self.selected = Some(id.clone());
        self.persist()?;

        tracing::debug!(session_id = %id, "Created session");
        Ok(Some(id))
    }

    /// Point the selection at `id`
    ///
    /// The id is not checked against the list; a stale selection is
    /// repaired by the next structural mutation.
    pub fn select_session(&mut self, id: &str) -> Result<()> {
        self.selected = Some(id.to_string());
        self.persist_selection()
    }

    /// Rename a session
    ///
    /// The title is trimmed; blank titles and unknown ids are ignored.
    /// Returns whether a session was renamed.
    pub fn rename_session(&mut self, id: &str, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }

        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        session.title = title.to_string();
        self.persist()?;
        Ok(true)
    }

    /// Remove a session
    ///
    /// A removed selection fails over to the new head. Removing the last
    /// session creates a fresh one. Returns whether a session was removed.
    pub fn delete_session(&mut self, id: &str) -> Result<bool> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Ok(false);
        }

        if self.sessions.is_empty() {
            self.selected = None;
            if let Some(identity) = self.identity.as_deref() {
                self.storage.remove(identity, StorageKey::Chats)?;
                self.storage.remove(identity, StorageKey::SelectedChatId)?;
            }
            self.create_session()?;
            return Ok(true);
        }

        self.repair_selection();
        self.persist()?;
        tracing::debug!(session_id = %id, "Deleted session");
        Ok(true)
    }

    /// Drop every session of the identity, erase its storage, and start over
    /// with one fresh session
    pub fn clear_all(&mut self) -> Result<()> {
        if let Some(identity) = self.identity.as_deref() {
            self.storage.remove(identity, StorageKey::Chats)?;
            self.storage.remove(identity, StorageKey::SelectedChatId)?;
        }
        self.sessions.clear();
        self.selected = None;
        self.create_session()?;
        tracing::info!("Cleared all sessions");
        Ok(())
    }

    /// Append a user message to a session
    ///
    /// A still-default title is derived from `content`. Returns the stored
    /// message, or `None` when the session does not exist.
    pub fn append_user_message(
        &mut self,
        session_id: &str,
        content: &str,
    ) -> Result<Option<Message>> {
        self.append(session_id, Sender::User, content)
    }

    /// Append an assistant message to a session
    ///
    /// Returns the stored message, or `None` when the session does not exist.
    pub fn append_assistant_message(
        &mut self,
        session_id: &str,
        content: &str,
    ) -> Result<Option<Message>> {
        self.append(session_id, Sender::Assistant, content)
    }

    fn append(&mut self, session_id: &str, sender: Sender, content: &str) -> Result<Option<Message>> {
        let Some(index) = self.sessions.iter().position(|s| s.id == session_id) else {
            tracing::warn!(session_id = %session_id, %sender, "Message for unknown session dropped");
            return Ok(None);
        };

        let now = Utc::now();
        let message = Message {
            id: self.ids.next_at(now),
            content: content.to_string(),
            sender,
            timestamp: time_of_day(now),
        };

        let session = &mut self.sessions[index];
        match sender {
            Sender::User => session.push_user(message.clone()),
            Sender::Assistant => session.push_assistant(message.clone()),
        }
        self.persist()?;
        Ok(Some(message))
    }

    fn repair_selection(&mut self) {
        let valid = self
            .selected
            .as_deref()
            .map(|id| self.sessions.iter().any(|s| s.id == id))
            .unwrap_or(false);
        if !valid {
            self.selected = self.sessions.first().map(|s| s.id.clone());
        }
    }

    fn persist(&self) -> Result<()> {
        let Some(identity) = self.identity.as_deref() else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.sessions).map_err(HookchatError::from)?;
        self.storage.set(identity, StorageKey::Chats, &json)?;
        self.persist_selection()
    }

    fn persist_selection(&self) -> Result<()> {
        let Some(identity) = self.identity.as_deref() else {
            return Ok(());
        };
        match self.selected.as_deref() {
            Some(id) => self.storage.set(identity, StorageKey::SelectedChatId, id),
            None => self.storage.remove(identity, StorageKey::SelectedChatId),
        }
    }
}
