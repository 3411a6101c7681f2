// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup validation of loaded configuration.
//!
//! Validation is deliberately strict: a misconfigured threshold or empty
//! credential string should fail at startup, not mid-conversation.

use advisor_core::AdvisorError;

use crate::model::AdvisorConfig;

/// Validate a loaded configuration, returning the first problem found.
pub fn validate(config: &AdvisorConfig) -> Result<(), AdvisorError> {
    if config.agent.name.trim().is_empty() {
        return Err(AdvisorError::Config("agent.name must not be empty".into()));
    }

    let threshold = config.chat.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AdvisorError::Config(format!(
            "chat.confidence_threshold must be in [0, 1], got {threshold}"
        )));
    }

    if config.chat.retrieval_limit == 0 {
        return Err(AdvisorError::Config(
            "chat.retrieval_limit must be at least 1".into(),
        ));
    }

    if config.chat.poll_interval_secs == 0 {
        return Err(AdvisorError::Config(
            "chat.poll_interval_secs must be at least 1".into(),
        ));
    }

    if config.chat.session_expiry_hours <= 0 {
        return Err(AdvisorError::Config(
            "chat.session_expiry_hours must be positive".into(),
        ));
    }

    // A present-but-empty credential is a configuration mistake, while an
    // absent one means "relay disabled".
    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        return Err(AdvisorError::Config(
            "telegram.bot_token must not be an empty string; omit it to disable the relay".into(),
        ));
    }
    if let Some(chat_id) = &config.telegram.chat_id
        && chat_id.trim().is_empty()
    {
        return Err(AdvisorError::Config(
            "telegram.chat_id must not be an empty string; omit it to disable the relay".into(),
        ));
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        return Err(AdvisorError::Config(
            "gateway.bearer_token must not be an empty string; omit it to disable auth".into(),
        ));
    }

    Ok(())
}
