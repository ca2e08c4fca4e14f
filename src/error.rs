//! Error types for hookchat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for hookchat operations
///
/// Most failures in the chat path are recovered locally (a fallback reply,
/// a fresh session). The variants here cover what still has to reach the
/// caller: configuration problems, storage backend failures, and the
/// authentication collaborator.
#[derive(Error, Debug)]
pub enum HookchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Webhook endpoint errors (non-success status, unreadable body)
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// Authentication errors (rejected credentials, expired session)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// An operation needed a signed-in identity but none is set
    #[error("No identity is signed in")]
    NoIdentity,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors from the interactive prompt
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for hookchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = HookchatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_storage_error_display() {
        let error = HookchatError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_webhook_error_display() {
        let error = HookchatError::Webhook("status 500".to_string());
        assert_eq!(error.to_string(), "Webhook error: status 500");
    }

    #[test]
    fn test_authentication_error_display() {
        let error = HookchatError::Authentication("Invalid credentials".to_string());
        assert_eq!(
            error.to_string(),
            "Authentication error: Invalid credentials"
        );
    }

    #[test]
    fn test_no_identity_error_display() {
        assert_eq!(
            HookchatError::NoIdentity.to_string(),
            "No identity is signed in"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: HookchatError = io_error.into();
        assert!(matches!(error, HookchatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: HookchatError = json_error.into();
        assert!(matches!(error, HookchatError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: HookchatError = yaml_error.into();
        assert!(matches!(error, HookchatError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HookchatError>();
    }
}
