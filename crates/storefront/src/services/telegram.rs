//! Telegram Bot API client.
//!
//! Only `sendMessage` is used: orders and parts-lookup requests are posted to
//! a single chat with HTML parse mode.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

use super::order::Notifier;
use crate::config::TelegramConfig;

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Errors from the Telegram Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("invalid response: {0}")]
    Response(String),

    /// Telegram rejected the call.
    #[error("Telegram API error ({status}): {description}")]
    Api { status: u16, description: String },
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram client bound to one bot and one chat.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    bot_token: SecretString,
    chat_id: String,
    api_base: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client for the configured bot and chat.
    #[must_use]
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    /// Create a client against a different API host (local bot API server, tests).
    #[must_use]
    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Post a message to the configured chat.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Telegram answers with a
    /// non-success status or `ok: false`.
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id, len = text.len()))]
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.bot_token.expose_secret()
        );
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let description = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %description, "Telegram API error");
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description,
            });
        }

        let result: ApiResponse = response
            .json()
            .await
            .map_err(|e| TelegramError::Response(e.without_url().to_string()))?;

        if !result.ok {
            let description = result
                .description
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(error = %description, "Telegram API rejected message");
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description,
            });
        }

        debug!("Message delivered to Telegram");
        Ok(())
    }
}

impl Notifier for TelegramClient {
    type Error = TelegramError;

    async fn notify(&self, message: &str) -> Result<(), Self::Error> {
        self.send_message(message).await
    }
}
