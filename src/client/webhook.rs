//! Webhook-backed [`ResponseClient`]
//!
//! Replies come from a `POST {message, chatId}` to the reply endpoint; every
//! completed exchange is posted to the exchange-log endpoint when one is
//! configured.

use crate::client::{extract_reply, ResponseClient, FALLBACK_REPLY};
use crate::config::WebhookConfig;
use crate::error::{HookchatError, Result};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Body posted to the reply endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    message: &'a str,
    chat_id: &'a str,
}

/// Body posted to the exchange-log endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeReport<'a> {
    user_message: &'a str,
    assistant_response: &'a str,
    timestamp: String,
    chat_id: &'a str,
}

/// HTTP client for the reply and exchange-log webhooks
///
/// # Examples
///
/// ```
/// use hookchat::client::WebhookClient;
/// use hookchat::config::WebhookConfig;
///
/// let config = WebhookConfig {
///     reply_url: "http://localhost:5678/webhook/chat".to_string(),
///     exchange_log_url: None,
///     timeout_seconds: 60,
/// };
/// let client = WebhookClient::new(&config);
/// assert!(client.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    reply_url: String,
    exchange_log_url: Option<String>,
}

impl WebhookClient {
    /// Create a client for the configured endpoints
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("hookchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HookchatError::Webhook(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            reply_url: config.reply_url.clone(),
            exchange_log_url: config.exchange_log_url.clone(),
        })
    }

    async fn request_reply(&self, message: &str, session_id: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.reply_url)
            .json(&ReplyRequest {
                message,
                chat_id: session_id,
            })
            .send()
            .await
            .map_err(HookchatError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HookchatError::Webhook(format!("reply endpoint returned {}", status)).into());
        }

        let body = response.text().await.map_err(HookchatError::from)?;
        Ok(extract_reply(&body))
    }

    async fn post_exchange(
        &self,
        url: &str,
        message: &str,
        reply: &str,
        session_id: &str,
    ) -> Result<()> {
        self.client
            .post(url)
            .json(&ExchangeReport {
                user_message: message,
                assistant_response: reply,
                timestamp: Utc::now().to_rfc3339(),
                chat_id: session_id,
            })
            .send()
            .await
            .map_err(HookchatError::from)?;
        Ok(())
    }
}

#[async_trait]
impl ResponseClient for WebhookClient {
    async fn fetch_reply(&self, message: &str, session_id: &str) -> String {
        match self.request_reply(message, session_id).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(session_id = %session_id, "Failed to get reply from webhook: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn report_exchange(&self, message: &str, reply: &str, session_id: &str) {
        let Some(url) = self.exchange_log_url.as_deref() else {
            tracing::debug!("No exchange log endpoint configured, skipping report");
            return;
        };

        if let Err(e) = self.post_exchange(url, message, reply, session_id).await {
            tracing::warn!(session_id = %session_id, "Failed to report exchange: {}", e);
        }
    }
}
