// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal Telegram Bot API client.
//!
//! Only `sendMessage` is needed; inbound traffic arrives via webhook, so
//! there is no long polling here.

use std::time::Duration;

use advisor_core::AdvisorError;
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_BASE_URL: &str = "https://api.telegram.org";

/// Parse mode for an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Plain,
    MarkdownV2,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client for the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct BotApi {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl BotApi {
    pub fn new(token: String) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AdvisorError::Relay {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            token,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends a message to a chat. Telegram reports failures as HTTP errors
    /// or as `{"ok": false}` bodies; both surface as [`AdvisorError::Relay`].
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), AdvisorError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: match parse_mode {
                ParseMode::Plain => None,
                ParseMode::MarkdownV2 => Some("MarkdownV2"),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisorError::Relay {
                message: format!("sendMessage request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Result<ApiResponse, _> = serde_json::from_str(&body);

        match parsed {
            Ok(api) if api.ok => {
                debug!(chat_id, "telegram message delivered");
                Ok(())
            }
            Ok(api) => Err(AdvisorError::Relay {
                message: format!(
                    "Telegram API error: {}",
                    api.description.unwrap_or_else(|| status.to_string())
                ),
                source: None,
            }),
            Err(_) => Err(AdvisorError::Relay {
                message: format!("sendMessage returned {status}: {body}"),
                source: None,
            }),
        }
    }
}
