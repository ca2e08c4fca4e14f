//! Durable key-value storage for session state
//!
//! The session store only needs `get`/`set`/`remove` by `(identity, key)`.
//! [`SqliteStorage`] keeps the entries in a single-table database under the
//! user's data directory; [`MemoryStorage`] keeps them in process for tests
//! and ephemeral runs.

use crate::error::{Result, HookchatError};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub mod types;
pub use types::StorageKey;

/// Persistence collaborator used by the session store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key` for `identity`
    fn get(&self, identity: &str, key: StorageKey) -> Result<Option<String>>;

    /// Write `value` under `key` for `identity`, replacing any previous value
    fn set(&self, identity: &str, key: StorageKey, value: &str) -> Result<()>;

    /// Remove `key` for `identity`; removing a missing key is not an error
    fn remove(&self, identity: &str, key: StorageKey) -> Result<()>;
}

/// SQLite-backed key-value storage
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the DB path via environment variable so the
        // binary can be pointed at a scratch file.
        if let Ok(override_path) = std::env::var("HOOKCHAT_DB") {
            return Self::new_with_path(override_path);
        }

        Self::new_with_path(Self::default_path()?)
    }

    /// Default database location inside the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "hookchat", "hookchat")
            .ok_or_else(|| HookchatError::Storage("Could not determine data directory".into()))?;

        Ok(proj_dirs.data_dir().join("sessions.db"))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use hookchat::storage::SqliteStorage;
    ///
    /// let dir = std::env::temp_dir().join("hookchat-doc");
    /// let storage = SqliteStorage::new_with_path(dir.join("sessions.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| HookchatError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| HookchatError::Storage(e.to_string()))?;
        Ok(conn)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                identity TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (identity, key)
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| HookchatError::Storage(e.to_string()))?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, identity: &str, key: StorageKey) -> Result<Option<String>> {
        let conn = self.open()?;

        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE identity = ? AND key = ?",
                params![identity, key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query value")
            .map_err(|e| HookchatError::Storage(e.to_string()))?;

        Ok(value)
    }

    fn set(&self, identity: &str, key: StorageKey, value: &str) -> Result<()> {
        let conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO kv_store (identity, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(identity, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![identity, key.as_str(), value, now],
        )
        .context("Failed to write value")
        .map_err(|e| HookchatError::Storage(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, identity: &str, key: StorageKey) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "DELETE FROM kv_store WHERE identity = ? AND key = ?",
            params![identity, key.as_str()],
        )
        .context("Failed to delete value")
        .map_err(|e| HookchatError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// In-process key-value storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<(String, StorageKey), String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all identities
    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.len())
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> HookchatError {
    HookchatError::Storage("memory storage lock poisoned".to_string())
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, identity: &str, key: StorageKey) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(&(identity.to_string(), key)).cloned())
    }

    fn set(&self, identity: &str, key: StorageKey, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert((identity.to_string(), key), value.to_string());
        Ok(())
    }

    fn remove(&self, identity: &str, key: StorageKey) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(&(identity.to_string(), key));
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, identity: &str, key: StorageKey) -> Result<Option<String>> {
        (**self).get(identity, key)
    }

    fn set(&self, identity: &str, key: StorageKey, value: &str) -> Result<()> {
        (**self).set(identity, key, value)
    }

    fn remove(&self, identity: &str, key: StorageKey) -> Result<()> {
        (**self).remove(identity, key)
    }
}

impl KeyValueStore for Box<dyn KeyValueStore> {
    fn get(&self, identity: &str, key: StorageKey) -> Result<Option<String>> {
        (**self).get(identity, key)
    }

    fn set(&self, identity: &str, key: StorageKey, value: &str) -> Result<()> {
        (**self).set(identity, key, value)
    }

    fn remove(&self, identity: &str, key: StorageKey) -> Result<()> {
        (**self).remove(identity, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    /// Helper: create a temporary storage instance backed by a temp directory.
    ///
    /// Returns both the `SqliteStorage` and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_storage() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("sessions.db");
        let storage = SqliteStorage::new_with_path(db_path).expect("failed to create storage");
        (storage, dir)
    }

    #[test]
    fn test_sqlite_storage_init_creates_table() {
        let (storage, _dir) = create_test_storage();
        let conn = Connection::open(&storage.db_path).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='kv_store'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (storage, _dir) = create_test_storage();
        let value = storage.get("alice", StorageKey::Chats).expect("get failed");
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let (storage, _dir) = create_test_storage();
        storage
            .set("alice", StorageKey::SelectedChatId, "1700000000000")
            .expect("set failed");

        let value = storage
            .get("alice", StorageKey::SelectedChatId)
            .expect("get failed");
        assert_eq!(value.as_deref(), Some("1700000000000"));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let (storage, _dir) = create_test_storage();
        storage.set("alice", StorageKey::Chats, "[]").expect("set 1");
        storage
            .set("alice", StorageKey::Chats, "[{\"id\":\"1\"}]")
            .expect("set 2");

        let value = storage.get("alice", StorageKey::Chats).expect("get failed");
        assert_eq!(value.as_deref(), Some("[{\"id\":\"1\"}]"));
    }

    #[test]
    fn test_values_are_namespaced_by_identity() {
        let (storage, _dir) = create_test_storage();
        storage.set("alice", StorageKey::Chats, "a").expect("set a");
        storage.set("bob", StorageKey::Chats, "b").expect("set b");

        assert_eq!(
            storage.get("alice", StorageKey::Chats).unwrap().as_deref(),
            Some("a")
        );
        assert_eq!(
            storage.get("bob", StorageKey::Chats).unwrap().as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (storage, _dir) = create_test_storage();
        storage.set("alice", StorageKey::Chats, "[]").expect("set");

        storage.remove("alice", StorageKey::Chats).expect("first remove");
        storage.remove("alice", StorageKey::Chats).expect("second remove");
        assert!(storage.get("alice", StorageKey::Chats).unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("sessions.db");
        {
            let storage = SqliteStorage::new_with_path(&db_path).expect("create");
            storage.set("alice", StorageKey::Chats, "[]").expect("set");
        }
        let reopened = SqliteStorage::new_with_path(&db_path).expect("reopen");
        assert_eq!(
            reopened.get("alice", StorageKey::Chats).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty().unwrap());

        storage.set("alice", StorageKey::Chats, "[]").unwrap();
        assert_eq!(storage.len().unwrap(), 1);
        assert_eq!(
            storage.get("alice", StorageKey::Chats).unwrap().as_deref(),
            Some("[]")
        );
        assert!(storage.get("bob", StorageKey::Chats).unwrap().is_none());

        storage.remove("alice", StorageKey::Chats).unwrap();
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_memory_storage_poisoned_lock_is_an_error() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let writer = std::sync::Arc::clone(&storage);
        let _ = std::thread::spawn(move || {
            let _guard = writer.entries.write().unwrap();
            panic!("writer died while holding the lock");
        })
        .join();

        assert!(storage.len().is_err());
        assert!(storage.is_empty().is_err());
        assert!(storage.get("alice", StorageKey::Chats).is_err());
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("sessions.db");
        env::set_var("HOOKCHAT_DB", db_path.to_string_lossy().to_string());

        let storage = SqliteStorage::new().expect("new failed with env override");
        assert_eq!(storage.path(), db_path.as_path());
        assert!(db_path.parent().unwrap().exists());

        env::remove_var("HOOKCHAT_DB");
    }
}
