// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-facing traits and request types.
//!
//! The agent talks to the LLM through [`ChatProvider`] so the orchestrator
//! can be exercised against a stub without network access.

use async_trait::async_trait;

use crate::error::AdvisorError;
use crate::types::Role;

/// One prior turn included in a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// A fully assembled generation request: system instruction (with the
/// knowledge block already folded in), recent history, and the new message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system_instruction: Option<String>,
    pub history: Vec<ChatTurn>,
    pub user_message: String,
}

/// Abstraction over the LLM backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate a reply for the assembled prompt.
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, AdvisorError>;
}
