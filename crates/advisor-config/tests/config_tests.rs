// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Advisor configuration system.

use advisor_config::model::ConfidenceStrategy;
use advisor_config::{load_config_from_str, validate};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_advisor_config() {
    let toml = r#"
[agent]
name = "course-advisor"
log_level = "debug"
default_instruction = "You are a helpful course advisor."

[gemini]
api_key = "test-key-123"
model = "gemini-2.0-flash-exp"

[telegram]
bot_token = "123:ABC"
chat_id = "-100456"
admin_base_url = "https://example.com"

[storage]
database_path = "/tmp/advisor-test.db"
documents_dir = "/tmp/advisor-docs"

[gateway]
host = "0.0.0.0"
port = 9090
bearer_token = "shared-secret"

[chat]
retrieval_limit = 8
confidence_threshold = 0.4
confidence_strategy = "phrase_length"
session_expiry_hours = 48
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "course-advisor");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.gemini.api_key.as_deref(), Some("test-key-123"));
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.chat_id.as_deref(), Some("-100456"));
    assert_eq!(config.telegram.admin_base_url, "https://example.com");
    assert_eq!(config.storage.database_path, "/tmp/advisor-test.db");
    assert_eq!(config.gateway.port, 9090);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("shared-secret"));
    assert_eq!(config.chat.retrieval_limit, 8);
    assert_eq!(config.chat.confidence_threshold, 0.4);
    assert_eq!(config.chat.confidence_strategy, ConfidenceStrategy::PhraseLength);
    assert_eq!(config.chat.session_expiry_hours, 48);
}

/// Unknown field in a section is rejected at load time.
#[test]
fn unknown_field_produces_error() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bot_tken"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Missing sections fall back to compiled defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "advisor");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.gemini.api_key.is_none());
    assert_eq!(config.gemini.model, "gemini-2.0-flash-exp");
    assert!(config.telegram.bot_token.is_none());
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.chat.retrieval_limit, 5);
    assert_eq!(config.chat.document_limit, 3);
    assert_eq!(config.chat.excerpt_max_chars, 500);
    assert_eq!(config.chat.confidence_threshold, 0.5);
    assert_eq!(config.chat.confidence_strategy, ConfidenceStrategy::Weighted);
}

/// Environment variables override TOML values via the ADVISOR_ prefix.
#[test]
fn env_var_mapping_uses_section_dots() {
    use advisor_config::model::AdvisorConfig;
    use figment::providers::{Env, Format, Serialized, Toml};
    use figment::Figment;

    figment::Jail::expect_with(|jail| {
        jail.set_env("ADVISOR_TELEGRAM_BOT_TOKEN", "env-token");
        jail.set_env("ADVISOR_CHAT_CONFIDENCE_THRESHOLD", "0.7");

        let config: AdvisorConfig = Figment::new()
            .merge(Serialized::defaults(AdvisorConfig::default()))
            .merge(Toml::string("[telegram]\nbot_token = \"toml-token\""))
            .merge(Env::prefixed("ADVISOR_").map(|key| {
                key.as_str()
                    .replacen("telegram_", "telegram.", 1)
                    .replacen("chat_", "chat.", 1)
                    .into()
            }))
            .extract()?;

        assert_eq!(config.telegram.bot_token.as_deref(), Some("env-token"));
        assert_eq!(config.chat.confidence_threshold, 0.7);
        Ok(())
    });
}

/// A loaded config passes validation end to end.
#[test]
fn loaded_config_validates() {
    let config = load_config_from_str(
        r#"
[chat]
confidence_threshold = 0.5
"#,
    )
    .unwrap();
    assert!(validate(&config).is_ok());
}
