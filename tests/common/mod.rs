use std::sync::Arc;
use tempfile::TempDir;
use hookchat::config::WebhookConfig;
use hookchat::storage::SqliteStorage;

#[allow(dead_code)]
pub fn create_temp_storage() -> (Arc<SqliteStorage>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("sessions.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (Arc::new(storage), tmp)
}

#[allow(dead_code)]
pub fn webhook_config(server_uri: &str, with_log: bool) -> WebhookConfig {
    WebhookConfig {
        reply_url: format!("{}/webhook/chat", server_uri),
        exchange_log_url: with_log.then(|| format!("{}/webhook/log", server_uri)),
        timeout_seconds: 5,
    }
}
