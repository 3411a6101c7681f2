// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin HTTP client over the gateway's widget surface.

use std::path::PathBuf;
use std::time::Duration;

use advisor_config::model::ChatConfig;
use advisor_core::AdvisorError;
use advisor_core::types::{Message, Session};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Widget-side configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Gateway base URL, without a trailing slash.
    pub base_url: String,
    /// Shared static credential for the widget surface.
    pub bearer_token: Option<String>,
    /// Handoff poll frequency.
    pub poll_interval: Duration,
    /// A stored token older than this is discarded and a new session starts.
    pub session_expiry_hours: i64,
    /// Where the session token is persisted between page loads. `None`
    /// starts a fresh session every time.
    pub token_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::from_chat("http://127.0.0.1:8080", &ChatConfig::default())
    }
}

impl WidgetConfig {
    /// Builds a widget config from the server's chat section, so the poll
    /// cadence and token expiry stay in lockstep with what the gateway
    /// advertises.
    pub fn from_chat(base_url: impl Into<String>, chat: &ChatConfig) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            poll_interval: Duration::from_secs(chat.poll_interval_secs),
            session_expiry_hours: chat.session_expiry_hours,
            token_path: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

/// Gateway reply to one chat turn.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    pub session_id: String,
    pub handoff_active: bool,
}

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client with the bearer credential baked in.
pub struct WidgetClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl WidgetClient {
    pub fn new(config: &WidgetConfig) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdvisorError::Internal(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send one visitor turn.
    pub async fn send_chat(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatOutcome, AdvisorError> {
        let response = self
            .authorize(self.client.post(format!("{}/v1/chat", self.base_url)))
            .json(&ChatRequest {
                message,
                session_id,
            })
            .send()
            .await
            .map_err(|e| AdvisorError::Internal(format!("chat request failed: {e}")))?;
        Self::decode(response).await
    }

    /// Session metadata for token revalidation. `None` when the server does
    /// not know the token.
    pub async fn fetch_session(&self, session_id: &str) -> Result<Option<Session>, AdvisorError> {
        let response = self
            .get(&format!("/v1/sessions/{session_id}"))
            .send()
            .await
            .map_err(|e| AdvisorError::Internal(format!("session lookup failed: {e}")))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::decode(response).await?))
    }

    /// Messages with an id greater than `after`, oldest first.
    pub async fn fetch_messages(
        &self,
        session_id: &str,
        after: Option<i64>,
    ) -> Result<Vec<Message>, AdvisorError> {
        let path = match after {
            Some(cursor) => format!("/v1/sessions/{session_id}/messages?after={cursor}"),
            None => format!("/v1/sessions/{session_id}/messages"),
        };
        let response = self
            .get(&path)
            .send()
            .await
            .map_err(|e| AdvisorError::Internal(format!("message poll failed: {e}")))?;
        let list: MessageListResponse = Self::decode(response).await?;
        Ok(list.messages)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AdvisorError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AdvisorError::Internal(format!("malformed gateway response: {e}")));
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("gateway returned {status}"));
        match status {
            StatusCode::BAD_REQUEST => Err(AdvisorError::Validation(message)),
            StatusCode::NOT_FOUND => Err(AdvisorError::NotFound(message)),
            _ => Err(AdvisorError::Internal(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_chat_carries_the_server_cadence() {
        let chat = ChatConfig {
            poll_interval_secs: 7,
            session_expiry_hours: 48,
            ..ChatConfig::default()
        };
        let config = WidgetConfig::from_chat("http://gateway:9000", &chat);
        assert_eq!(config.base_url, "http://gateway:9000");
        assert_eq!(config.poll_interval, Duration::from_secs(7));
        assert_eq!(config.session_expiry_hours, 48);
    }

    #[test]
    fn default_config_matches_the_default_chat_section() {
        let config = WidgetConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.session_expiry_hours, 24);
    }
}
