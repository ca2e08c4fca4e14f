//! hookchat - terminal chat client for webhook-backed assistants
//!
//! This library provides the session model, its write-through storage, and
//! the clients used to obtain replies and report exchanges.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Sessions, messages, and the per-identity `SessionStore`
//! - `storage`: Key-value persistence (`SqliteStorage`, `MemoryStorage`)
//! - `client`: `ResponseClient` trait and the webhook implementation
//! - `chat`: Send orchestration on top of the store and client
//! - `auth`: Client for the authentication backend
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hookchat::{ChatController, Config, SessionStore, WebhookClient};
//! use hookchat::storage::SqliteStorage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &hookchat::cli::Cli::parse_args())?;
//!     config.validate()?;
//!
//!     let mut store = SessionStore::new(SqliteStorage::new()?);
//!     store.set_identity(Some("alice".to_string()))?;
//!
//!     let client = WebhookClient::new(&config.webhook)?;
//!     let mut chat = ChatController::new(store, Arc::new(client));
//!     if let Some(reply) = chat.send_message("Hello").await? {
//!         println!("{}", reply);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chat;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use auth::{AuthClient, Identity};
pub use chat::{ChatController, PendingReply};
pub use client::{ResponseClient, WebhookClient, FALLBACK_REPLY};
pub use config::Config;
pub use error::{HookchatError, Result};
pub use session::{Message, Sender, Session, SessionStore};
pub use storage::{KeyValueStore, MemoryStorage, SqliteStorage};
