// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Advisor chat backend.
//!
//! Runtime settings (bot token, chat id, retrieval limits, confidence
//! threshold) are a typed struct with named fields and explicit defaults,
//! loaded once from the TOML/env hierarchy and validated at startup.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AdvisorConfig, AgentConfig, ChatConfig, ConfidenceStrategy, GatewayConfig, GeminiConfig,
    StorageConfig, TelegramConfig,
};
pub use validation::validate;

use advisor_core::AdvisorError;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<AdvisorConfig, AdvisorError> {
    let config = load_config().map_err(|e| AdvisorError::Config(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}
