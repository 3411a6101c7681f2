// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Advisor chat backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Advisor configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdvisorConfig {
    /// Agent identity and system-prompt settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Telegram escalation-relay settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Chat orchestration tunables (retrieval, confidence, polling).
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the advisor.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fallback system instruction used when no version is active in storage.
    #[serde(default)]
    pub default_instruction: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            default_instruction: None,
        }
    }
}

fn default_agent_name() -> String {
    "advisor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for generateContent requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Telegram escalation-relay configuration.
///
/// When `bot_token` or `chat_id` is unset, outbound notifications are treated
/// as disabled, not as an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the relay.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Operator chat id that receives escalation notifications.
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Base URL used to build admin deep links in notifications.
    #[serde(default = "default_admin_base_url")]
    pub admin_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            admin_base_url: default_admin_base_url(),
        }
    }
}

fn default_admin_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory holding uploaded knowledge-document blobs.
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            documents_dir: default_documents_dir(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("advisor").join("advisor.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "advisor.db".to_string())
}

fn default_documents_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("advisor").join("documents"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "documents".to_string())
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared static bearer token. `None` disables auth (local development).
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Which confidence heuristic the orchestrator applies to AI replies.
///
/// The weighted numeric score is the default; the phrase/length check is the
/// earlier, simpler strategy kept as a named alternative rather than merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceStrategy {
    Weighted,
    PhraseLength,
}

/// Chat orchestration tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Maximum knowledge entries included in the prompt.
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,

    /// Maximum document excerpts included in the prompt.
    #[serde(default = "default_document_limit")]
    pub document_limit: usize,

    /// Document excerpts are truncated to this many characters.
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,

    /// Number of recent turns rendered into the prompt.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// Confidence scores below this mark the turn as needing human help.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Replies shorter than this incur a confidence penalty.
    #[serde(default = "default_min_reply_chars")]
    pub min_reply_chars: usize,

    /// Active confidence heuristic.
    #[serde(default = "default_confidence_strategy")]
    pub confidence_strategy: ConfidenceStrategy,

    /// Widget poll interval while in handoff mode, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// A stored session token is reused only while the session's last
    /// activity is within this many hours.
    #[serde(default = "default_session_expiry_hours")]
    pub session_expiry_hours: i64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            retrieval_limit: default_retrieval_limit(),
            document_limit: default_document_limit(),
            excerpt_max_chars: default_excerpt_max_chars(),
            history_turns: default_history_turns(),
            confidence_threshold: default_confidence_threshold(),
            min_reply_chars: default_min_reply_chars(),
            confidence_strategy: default_confidence_strategy(),
            poll_interval_secs: default_poll_interval_secs(),
            session_expiry_hours: default_session_expiry_hours(),
        }
    }
}

fn default_retrieval_limit() -> usize {
    5
}

fn default_document_limit() -> usize {
    3
}

fn default_excerpt_max_chars() -> usize {
    500
}

fn default_history_turns() -> usize {
    6
}

fn default_confidence_threshold() -> f64 {
    0.5
}

fn default_min_reply_chars() -> usize {
    40
}

fn default_confidence_strategy() -> ConfidenceStrategy {
    ConfidenceStrategy::Weighted
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_session_expiry_hours() -> i64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = AdvisorConfig::default();
        assert_eq!(config.agent.name, "advisor");
        assert_eq!(config.gemini.model, "gemini-2.0-flash-exp");
        assert_eq!(config.chat.confidence_threshold, 0.5);
        assert_eq!(config.chat.poll_interval_secs, 3);
        assert_eq!(config.chat.session_expiry_hours, 24);
        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.chat.confidence_strategy, ConfidenceStrategy::Weighted);
    }

    #[test]
    fn confidence_strategy_deserializes_snake_case() {
        let s: ConfidenceStrategy = serde_json::from_str("\"phrase_length\"").unwrap();
        assert_eq!(s, ConfidenceStrategy::PhraseLength);
        let s: ConfidenceStrategy = serde_json::from_str("\"weighted\"").unwrap();
        assert_eq!(s, ConfidenceStrategy::Weighted);
    }
}
