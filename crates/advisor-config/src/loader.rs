// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./advisor.toml` > `~/.config/advisor/advisor.toml` >
//! `/etc/advisor/advisor.toml` with environment variable overrides via the
//! `ADVISOR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AdvisorConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/advisor/advisor.toml` (system-wide)
/// 3. `~/.config/advisor/advisor.toml` (user XDG config)
/// 4. `./advisor.toml` (local directory)
/// 5. `ADVISOR_*` environment variables
pub fn load_config() -> Result<AdvisorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdvisorConfig::default()))
        .merge(Toml::file("/etc/advisor/advisor.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("advisor/advisor.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("advisor.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string (no file lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<AdvisorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdvisorConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AdvisorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdvisorConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ADVISOR_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("ADVISOR_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("chat_", "chat.", 1);
        mapped.into()
    })
}
