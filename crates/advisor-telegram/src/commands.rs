// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook command handling.
//!
//! Operators drive the relay with three commands: `/reply` appends an
//! operator message and switches the session to human handoff, `/active`
//! lists sessions waiting for help, `/help` (and `/start`) print usage.
//! Anything else is ignored so stray chat messages never cause errors.

use advisor_core::AdvisorError;
use advisor_core::types::{Role, SessionStatus};
use advisor_storage::Database;
use advisor_storage::queries::{messages, sessions};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::{BotApi, ParseMode};

/// Maximum sessions listed by `/active`.
const ACTIVE_LIMIT: i64 = 10;

const HELP_TEXT: &str = "Advisor support bot commands:\n\
    /reply <session_id> <message> - answer a visitor and take over the session\n\
    /active - list sessions waiting for help\n\
    /help - show this reference";

/// A Telegram webhook update. Only the fields the relay needs are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Processes webhook updates against the session store.
pub struct CommandHandler {
    db: Database,
    api: Option<BotApi>,
    /// When set, updates from any other chat are ignored.
    allowed_chat_id: Option<String>,
}

impl CommandHandler {
    pub fn new(db: Database, api: Option<BotApi>, allowed_chat_id: Option<String>) -> Self {
        Self {
            db,
            api,
            allowed_chat_id,
        }
    }

    /// Handle one webhook update. Unknown or non-command input is a no-op;
    /// only storage and delivery failures surface as errors.
    pub async fn handle_update(&self, update: Update) -> Result<(), AdvisorError> {
        let Some(message) = update.message else {
            return Ok(());
        };
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };

        let chat_id = message.chat.id.to_string();
        if let Some(allowed) = &self.allowed_chat_id
            && allowed != &chat_id
        {
            warn!(chat_id, "ignoring update from unauthorized chat");
            return Ok(());
        }

        let text = text.trim();
        if let Some(rest) = text.strip_prefix("/reply") {
            self.handle_reply(&chat_id, rest).await
        } else if text == "/active" {
            self.handle_active(&chat_id).await
        } else if text == "/help" || text == "/start" {
            self.respond(&chat_id, HELP_TEXT).await
        } else {
            debug!(chat_id, "ignoring non-command update");
            Ok(())
        }
    }

    /// `/reply <session_id> <message>`: append an operator turn and switch
    /// the session into human handoff so later visitor messages skip the AI.
    async fn handle_reply(&self, chat_id: &str, args: &str) -> Result<(), AdvisorError> {
        let args = args.trim();
        let Some((session_id, reply_text)) = args.split_once(char::is_whitespace) else {
            return self
                .respond(chat_id, "Invalid format. Use: /reply <session_id> <message>")
                .await;
        };
        let reply_text = reply_text.trim();
        if reply_text.is_empty() {
            return self
                .respond(chat_id, "Invalid format. Use: /reply <session_id> <message>")
                .await;
        }

        if sessions::get_session(&self.db, session_id).await?.is_none() {
            return self
                .respond(chat_id, &format!("Session not found: {session_id}"))
                .await;
        }

        messages::append_message(&self.db, session_id, Role::Agent, reply_text, false, Some(1.0))
            .await?;
        sessions::set_handoff(&self.db, session_id, true).await?;

        info!(session_id, "operator reply delivered, handoff active");
        self.respond(chat_id, &format!("Reply sent to session {session_id}"))
            .await
    }

    /// `/active`: sessions flagged needs_help, most recently active first.
    async fn handle_active(&self, chat_id: &str) -> Result<(), AdvisorError> {
        let waiting =
            sessions::list_sessions(&self.db, Some(SessionStatus::NeedsHelp), ACTIVE_LIMIT).await?;

        if waiting.is_empty() {
            return self.respond(chat_id, "No active support requests.").await;
        }

        let mut lines = vec![format!("Sessions waiting for help ({}):", waiting.len())];
        for session in &waiting {
            lines.push(format!(
                "- {} (last activity {})",
                session.session_id, session.last_activity_at
            ));
        }
        self.respond(chat_id, &lines.join("\n")).await
    }

    async fn respond(&self, chat_id: &str, text: &str) -> Result<(), AdvisorError> {
        let Some(api) = &self.api else {
            return Ok(());
        };
        api.send_message(chat_id, text, ParseMode::Plain).await
    }
}
