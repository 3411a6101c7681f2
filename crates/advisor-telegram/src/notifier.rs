// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound escalation notifications.
//!
//! Triggers fire independently per session: a one-shot first-contact
//! notification, a stuck notification whenever a turn scores below the
//! confidence threshold, and a support-request notification when the model
//! asks for a human. Each `send_*` returns whether a message was actually
//! dispatched, so callers can tell "sent" from "relay disabled".

use advisor_config::model::TelegramConfig;
use advisor_core::AdvisorError;
use advisor_core::types::{Message, Role};
use tracing::info;

use crate::api::{BotApi, ParseMode};
use crate::markdown::escape_markdown_v2;

/// Character cap for the first-message excerpt in notifications.
const EXCERPT_CHARS: usize = 200;

/// Character cap per turn in a stuck-session transcript.
const TURN_CHARS: usize = 100;

/// Number of trailing turns included in a stuck notification.
const STUCK_TURNS: usize = 3;

/// Sends escalation notifications to the configured support chat.
pub struct Notifier {
    api: Option<BotApi>,
    chat_id: Option<String>,
    admin_base_url: String,
}

impl Notifier {
    /// Builds a notifier from the telegram config section. Missing bot
    /// credentials produce a disabled notifier, not an error.
    pub fn new(config: &TelegramConfig) -> Result<Self, AdvisorError> {
        let api = match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(_)) => Some(BotApi::new(token.clone())?),
            _ => {
                info!("telegram credentials absent, escalation relay disabled");
                None
            }
        };

        Ok(Self {
            api,
            chat_id: config.chat_id.clone(),
            admin_base_url: config.admin_base_url.clone(),
        })
    }

    #[cfg(test)]
    pub fn for_tests(api: Option<BotApi>, chat_id: Option<String>, admin_base_url: &str) -> Self {
        Self {
            api,
            chat_id,
            admin_base_url: admin_base_url.to_string(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.api.is_some()
    }

    async fn dispatch(&self, text: &str) -> Result<bool, AdvisorError> {
        let (Some(api), Some(chat_id)) = (&self.api, &self.chat_id) else {
            return Ok(false);
        };
        api.send_message(chat_id, text, ParseMode::MarkdownV2).await?;
        Ok(true)
    }

    fn deep_link(&self, session_id: &str) -> String {
        format!(
            "{}/admin/chat-history?session={}",
            self.admin_base_url, session_id
        )
    }

    /// First-contact notification with an excerpt of the opening message.
    pub async fn send_new_session(
        &self,
        session_id: &str,
        first_message: &str,
    ) -> Result<bool, AdvisorError> {
        let text = format!(
            "\u{1F514} *New chat session*\n\nSession: `{}`\nFirst message: {}\n\n[Open conversation]({})",
            escape_markdown_v2(session_id),
            escape_markdown_v2(&truncate_chars(first_message, EXCERPT_CHARS)),
            self.deep_link(session_id),
        );
        self.dispatch(&text).await
    }

    /// Stuck notification carrying the last few turns for triage context.
    pub async fn send_stuck(
        &self,
        session_id: &str,
        recent: &[Message],
    ) -> Result<bool, AdvisorError> {
        let text = format!(
            "\u{26A0} *AI needs help*\n\nSession: `{}`\n\n{}\n\n[Open conversation]({})",
            escape_markdown_v2(session_id),
            transcript(recent, STUCK_TURNS),
            self.deep_link(session_id),
        );
        self.dispatch(&text).await
    }

    /// Support-request notification fired when the model itself asks for a
    /// human. Carries the full recent history and the takeover command.
    pub async fn send_handoff(
        &self,
        session_id: &str,
        history: &[Message],
    ) -> Result<bool, AdvisorError> {
        let text = format!(
            "\u{1F198} *Support request*\n\nSession: `{}`\n\n{}\n\nReply with: /reply {} \\<message\\>\n[Open conversation]({})",
            escape_markdown_v2(session_id),
            transcript(history, history.len()),
            escape_markdown_v2(session_id),
            self.deep_link(session_id),
        );
        self.dispatch(&text).await
    }

    /// Forward a visitor message while the session is in human handoff.
    pub async fn send_handoff_message(
        &self,
        session_id: &str,
        message_text: &str,
    ) -> Result<bool, AdvisorError> {
        let text = format!(
            "\u{1F4AC} *Visitor message* \\(handoff\\)\n\nSession: `{}`\n{}\n\nReply with: /reply {} \\<message\\>",
            escape_markdown_v2(session_id),
            escape_markdown_v2(message_text),
            escape_markdown_v2(session_id),
        );
        self.dispatch(&text).await
    }

    /// Admin connectivity check.
    pub async fn send_test(&self) -> Result<bool, AdvisorError> {
        self.dispatch("\u{2705} Advisor escalation relay is connected\\.")
            .await
    }
}

/// Render the last `max_turns` of a transcript as escaped `Who: text` lines.
fn transcript(turns: &[Message], max_turns: usize) -> String {
    turns
        .iter()
        .rev()
        .take(max_turns)
        .rev()
        .map(|m| {
            let who = match m.role {
                Role::User => "Visitor",
                Role::Model => "AI",
                Role::Agent => "Operator",
            };
            format!(
                "{}: {}",
                who,
                escape_markdown_v2(&truncate_chars(&m.message_text, TURN_CHARS))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to `max` characters on a char boundary, with an ellipsis when cut.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
