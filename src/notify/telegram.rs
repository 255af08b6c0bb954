//! Telegram Bot API transport.
//!
//! API docs: https://core.telegram.org/bots/api#sendmessage
//! Auth: bot token embedded in the request path.
//!
//! Messages are plain text with link previews disabled. A short request
//! timeout keeps an unresponsive API from stalling the scan loop.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

use super::Notifier;
use crate::config::TelegramCredentials;
use crate::types::FlipError;

const BASE_URL: &str = "https://api.telegram.org";
const TRANSPORT_NAME: &str = "telegram";

pub struct TelegramNotifier {
    http: Client,
    base_url: String,
    bot_token: SecretString,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(credentials: TelegramCredentials, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(credentials, timeout_secs, BASE_URL)
    }

    /// Point the notifier at a different API host (e.g. a local Bot API server).
    pub fn with_base_url(
        credentials: TelegramCredentials,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client for Telegram")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: credentials.bot_token,
            chat_id: credentials.chat_id,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token.expose_secret())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("disable_web_page_preview", "true"),
        ];

        // Errors must not echo the endpoint: it carries the bot token
        let resp = self
            .http
            .post(self.endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Telegram sendMessage request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FlipError::HttpStatus {
                target: "telegram sendMessage".to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        debug!(chars = text.chars().count(), "Telegram message delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        TRANSPORT_NAME
    }
}
