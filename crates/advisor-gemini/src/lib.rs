// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Advisor chat backend.
//!
//! Implements [`ChatProvider`] over the `generateContent` API. API key
//! resolution order: config -> `GEMINI_API_KEY` env var -> error.

pub mod client;
pub mod types;

use std::time::Duration;

use advisor_config::model::GeminiConfig;
use advisor_core::error::AdvisorError;
use advisor_core::traits::{ChatPrompt, ChatProvider};
use advisor_core::types::Role;
use async_trait::async_trait;
use tracing::info;

use crate::client::GeminiClient;
use crate::types::{ApiContent, GenerateRequest};

/// Gemini provider implementing [`ChatProvider`].
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a new provider from the gemini config section.
    pub fn new(config: &GeminiConfig) -> Result<Self, AdvisorError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            api_key,
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(model = config.model, "Gemini provider initialized");
        Ok(Self { client })
    }

    /// Converts an assembled [`ChatPrompt`] to a wire request.
    ///
    /// Gemini only accepts "user" and "model" roles; operator turns are
    /// presented as "model" since the visitor experienced them as replies.
    fn to_generate_request(&self, prompt: &ChatPrompt) -> GenerateRequest {
        let mut contents: Vec<ApiContent> = prompt
            .history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Model | Role::Agent => "model",
                };
                ApiContent::text(Some(role), &turn.text)
            })
            .collect();
        contents.push(ApiContent::text(Some("user"), &prompt.user_message));

        GenerateRequest {
            system_instruction: prompt
                .system_instruction
                .as_deref()
                .map(|text| ApiContent::text(None, text)),
            contents,
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, AdvisorError> {
        let request = self.to_generate_request(prompt);
        let response = self.client.generate_content(&request).await?;
        response.first_text().ok_or_else(|| AdvisorError::Provider {
            message: "Gemini returned no text candidates".into(),
            source: None,
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, AdvisorError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        AdvisorError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}
