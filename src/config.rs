//! Configuration management for hookchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{HookchatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for hookchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reply and exchange-log endpoints
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Authentication backend
    #[serde(default)]
    pub auth: AuthConfig,

    /// Session storage
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Webhook endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint that produces assistant replies
    #[serde(default = "default_reply_url")]
    pub reply_url: String,

    /// Endpoint that records completed exchanges; reporting is skipped when unset
    #[serde(default)]
    pub exchange_log_url: Option<String>,

    /// Request timeout for both endpoints (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_reply_url() -> String {
    "http://localhost:5678/webhook/chat".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            reply_url: default_reply_url(),
            exchange_log_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Authentication backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base address of the auth backend; routes live under `/api/auth`
    #[serde(default = "default_auth_url")]
    pub base_url: String,
}

fn default_auth_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: default_auth_url(),
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HookchatError::Config(format!("Failed to read config file: {}", e)))?;
        Ok(serde_yaml::from_str(&contents).map_err(HookchatError::from)?)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(reply_url) = std::env::var("HOOKCHAT_REPLY_URL") {
            self.webhook.reply_url = reply_url;
        }

        if let Ok(log_url) = std::env::var("HOOKCHAT_EXCHANGE_LOG_URL") {
            self.webhook.exchange_log_url = if log_url.trim().is_empty() {
                None
            } else {
                Some(log_url)
            };
        }

        if let Ok(timeout) = std::env::var("HOOKCHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.webhook.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid HOOKCHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(auth_url) = std::env::var("HOOKCHAT_AUTH_URL") {
            self.auth.base_url = auth_url;
        }

        if let Ok(storage_path) = std::env::var("HOOKCHAT_STORAGE_PATH") {
            tracing::debug!(storage_path = %storage_path, "Env override: HOOKCHAT_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(storage_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is not an http(s) URL or the timeout is zero
    pub fn validate(&self) -> Result<()> {
        validate_http_url("webhook.reply_url", &self.webhook.reply_url)?;

        if let Some(log_url) = &self.webhook.exchange_log_url {
            validate_http_url("webhook.exchange_log_url", log_url)?;
        }

        if self.webhook.timeout_seconds == 0 {
            return Err(HookchatError::Config(
                "webhook.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        validate_http_url("auth.base_url", &self.auth.base_url)?;

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| HookchatError::Config(format!("{} is not a valid URL: {}", field, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(HookchatError::Config(format!(
            "{} must use http or https, got {}",
            field, other
        ))
        .into()),
    }
}
