//! Message send orchestration
//!
//! A send appends the user message, waits for the reply, appends the
//! assistant message to the session captured before waiting, and then hands
//! the exchange to a detached reporting task.

use crate::client::ResponseClient;
use crate::error::Result;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A user message that has been stored and is waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    /// Session the reply belongs to, fixed when the send began
    pub session_id: String,
    /// Trimmed user message as stored
    pub content: String,
}

/// Drives sends against a [`SessionStore`] using a [`ResponseClient`]
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hookchat::chat::ChatController;
/// use hookchat::client::WebhookClient;
/// use hookchat::config::WebhookConfig;
/// use hookchat::session::SessionStore;
/// use hookchat::storage::MemoryStorage;
///
/// # async fn example() -> hookchat::error::Result<()> {
/// let mut store = SessionStore::new(MemoryStorage::new());
/// store.set_identity(Some("alice".to_string()))?;
///
/// let client = WebhookClient::new(&WebhookConfig::default())?;
/// let mut chat = ChatController::new(store, Arc::new(client));
/// let reply = chat.send_message("Hello").await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatController<S: KeyValueStore> {
    store: SessionStore<S>,
    client: Arc<dyn ResponseClient>,
}

impl<S: KeyValueStore> ChatController<S> {
    pub fn new(store: SessionStore<S>, client: Arc<dyn ResponseClient>) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    /// Shared handle to the reply client, for fetching outside the controller
    pub fn client(&self) -> Arc<dyn ResponseClient> {
        Arc::clone(&self.client)
    }

    /// Send a message in the selected session and wait for the reply
    ///
    /// Returns the reply, or `None` when nothing was sent: blank input, or
    /// no selected session (a new session is created and the message is
    /// dropped). Sends through one controller are serialized by `&mut self`.
    pub async fn send_message(&mut self, content: &str) -> Result<Option<String>> {
        let Some(pending) = self.begin_send(content)? else {
            return Ok(None);
        };

        let reply = self
            .client
            .fetch_reply(&pending.content, &pending.session_id)
            .await;

        // Reporting runs detached; the handle is intentionally dropped.
        let _report = self.complete_send(&pending, &reply)?;
        Ok(Some(reply))
    }

    /// Store the user message and capture the target session
    pub fn begin_send(&mut self, content: &str) -> Result<Option<PendingReply>> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let Some(session_id) = self.store.selected_session().map(|s| s.id.clone()) else {
            tracing::info!("No session selected, creating one; message not sent");
            self.store.create_session()?;
            return Ok(None);
        };

        self.store.append_user_message(&session_id, content)?;
        tracing::debug!(session_id = %session_id, "User message stored, awaiting reply");

        Ok(Some(PendingReply {
            session_id,
            content: content.to_string(),
        }))
    }

    /// Store the reply for a pending send and start reporting the exchange
    ///
    /// Must run inside a Tokio runtime. The returned handle may be awaited
    /// or dropped; dropping it does not cancel the report.
    pub fn complete_send(&mut self, pending: &PendingReply, reply: &str) -> Result<JoinHandle<()>> {
        self.store
            .append_assistant_message(&pending.session_id, reply)?;

        Ok(spawn_report(
            self.client(),
            pending.content.clone(),
            reply.to_string(),
            pending.session_id.clone(),
        ))
    }
}

/// Report an exchange on a detached task
pub fn spawn_report(
    client: Arc<dyn ResponseClient>,
    message: String,
    reply: String,
    session_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        client.report_exchange(&message, &reply, &session_id).await;
    })
}
