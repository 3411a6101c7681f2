// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn orchestration pipeline.
//!
//! One visitor message runs: session ensure -> handoff short-circuit ->
//! retrieval -> prompt -> LLM -> confidence/escalation evaluation ->
//! persistence and notifications. Persistence is best-effort after the LLM
//! call: the visitor always gets their answer even if a write fails, and
//! the lost write is logged as a recoverable inconsistency.

use std::sync::Arc;

use advisor_config::model::ChatConfig;
use advisor_core::AdvisorError;
use advisor_core::traits::ChatProvider;
use advisor_core::types::{Message, Role, Session, SessionStatus};
use advisor_retrieval::{KnowledgeBundle, Retriever};
use advisor_storage::Database;
use advisor_storage::queries::{instructions, messages, sessions};
use advisor_telegram::Notifier;
use tracing::{error, info, warn};

use crate::confidence::{ConfidenceEvaluator, evaluator_for};
use crate::prompt;

pub use advisor_core::replies::{ESCALATION_MARKER, FALLBACK_REPLY, FORWARDED_REPLY, HANDOFF_ACK};

/// Outcome of one visitor turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub handoff_active: bool,
}

/// Drives the response state machine for every visitor turn.
pub struct Orchestrator {
    db: Database,
    retriever: Retriever,
    provider: Arc<dyn ChatProvider>,
    notifier: Arc<Notifier>,
    evaluator: Box<dyn ConfidenceEvaluator>,
    config: ChatConfig,
    default_instruction: Option<String>,
}

impl Orchestrator {
    pub fn new(
        db: Database,
        retriever: Retriever,
        provider: Arc<dyn ChatProvider>,
        notifier: Arc<Notifier>,
        config: ChatConfig,
        default_instruction: Option<String>,
    ) -> Self {
        let evaluator = evaluator_for(
            config.confidence_strategy,
            config.confidence_threshold,
            config.min_reply_chars,
        );
        Self {
            db,
            retriever,
            provider,
            notifier,
            evaluator,
            config,
            default_instruction,
        }
    }

    /// Process one visitor message and produce the visitor-facing reply.
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ChatReply, AdvisorError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisorError::Validation("message must not be empty".into()));
        }
        if session_id.trim().is_empty() {
            return Err(AdvisorError::Validation("session id must not be empty".into()));
        }

        // Session-store failure degrades to a stateless turn rather than
        // failing the visible conversation.
        let session = match sessions::ensure_session(&self.db, session_id).await {
            Ok(session) => Some(session),
            Err(e) => {
                error!(session_id, error = %e, "session store unavailable, continuing without persistence");
                None
            }
        };

        if session.as_ref().is_some_and(|s| s.handoff_active) {
            return self.relay_handoff_message(session_id, text).await;
        }

        let history = if session.is_some() {
            messages::recent_messages(&self.db, session_id, self.config.history_turns as i64)
                .await
                .unwrap_or_else(|e| {
                    warn!(session_id, error = %e, "history load failed, replying without context");
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        if session.is_some() {
            self.try_append(session_id, Role::User, text, false, None).await;
        }
        self.maybe_notify_first_contact(session.as_ref(), text).await;

        let knowledge = self
            .retriever
            .retrieve(text)
            .await
            .unwrap_or_else(|e| {
                warn!(session_id, error = %e, "knowledge retrieval failed, replying ungrounded");
                KnowledgeBundle::default()
            });
        let instruction = self.active_instruction().await;
        let chat_prompt = prompt::assemble(instruction.as_deref(), &knowledge, &history, text);

        let raw = match self.provider.generate(&chat_prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                // Transport failure is not low confidence; never mark it as
                // a stuck turn.
                warn!(session_id, error = %e, "LLM call failed, returning fallback");
                if session.is_some() {
                    self.try_append(session_id, Role::Model, FALLBACK_REPLY, false, None)
                        .await;
                }
                return Ok(ChatReply {
                    response: FALLBACK_REPLY.to_string(),
                    handoff_active: false,
                });
            }
        };

        self.finish_ai_turn(session.as_ref(), session_id, text, &raw).await
    }

    /// Evaluate, persist, and possibly escalate a successful AI reply.
    async fn finish_ai_turn(
        &self,
        session: Option<&Session>,
        session_id: &str,
        user_text: &str,
        raw_reply: &str,
    ) -> Result<ChatReply, AdvisorError> {
        let marker_present = raw_reply.contains(ESCALATION_MARKER);
        let stripped = raw_reply.replace(ESCALATION_MARKER, "");
        let stripped = stripped.trim();

        let visible = if marker_present {
            if stripped.is_empty() {
                HANDOFF_ACK.to_string()
            } else {
                format!("{stripped}\n\n{HANDOFF_ACK}")
            }
        } else {
            stripped.to_string()
        };

        let verdict = self.evaluator.evaluate(user_text, stripped);
        let needs_help = marker_present || verdict.needs_help;
        let resolved = session.is_some_and(|s| s.status == SessionStatus::Resolved);

        if session.is_some() {
            self.try_append(session_id, Role::Model, &visible, needs_help, verdict.score)
                .await;

            if marker_present {
                info!(session_id, "model requested escalation, activating handoff");
                if let Err(e) = sessions::set_handoff(&self.db, session_id, true).await {
                    error!(session_id, error = %e, "failed to persist handoff flag");
                }
            }

            // Resolved sessions accept new messages but never re-enter triage.
            if needs_help && !resolved {
                if let Err(e) =
                    sessions::set_status(&self.db, session_id, SessionStatus::NeedsHelp).await
                {
                    error!(session_id, error = %e, "failed to flag session as needing help");
                }
                // A model-requested handoff gets the full support-request
                // notification; low confidence alone gets the stuck alert.
                if marker_present {
                    self.notify_handoff(session_id).await;
                } else {
                    self.notify_stuck(session_id).await;
                }
            }
        }

        Ok(ChatReply {
            response: visible,
            handoff_active: marker_present,
        })
    }

    /// Handoff mode: forward to the operator channel, never call the LLM.
    async fn relay_handoff_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ChatReply, AdvisorError> {
        self.try_append(session_id, Role::User, text, false, None).await;

        match self.notifier.send_handoff_message(session_id, text).await {
            Ok(true) => info!(session_id, "handoff message forwarded to operator channel"),
            Ok(false) => warn!(session_id, "handoff active but relay disabled, message only persisted"),
            Err(e) => error!(session_id, error = %e, "failed to forward handoff message"),
        }

        self.try_append(session_id, Role::Model, FORWARDED_REPLY, false, None)
            .await;

        Ok(ChatReply {
            response: FORWARDED_REPLY.to_string(),
            handoff_active: true,
        })
    }

    /// One-shot first-contact notification, tolerating the narrow
    /// double-submit race (a duplicate alert is acceptable).
    async fn maybe_notify_first_contact(&self, session: Option<&Session>, incoming: &str) {
        let Some(session) = session else { return };
        if session.telegram_notified {
            return;
        }

        let excerpt = self.first_contact_excerpt(&session.session_id, incoming).await;
        match self
            .notifier
            .send_new_session(&session.session_id, &excerpt)
            .await
        {
            Ok(true) => {
                if let Err(e) = sessions::set_notified(&self.db, &session.session_id).await {
                    error!(session_id = session.session_id, error = %e, "failed to persist notification flag");
                }
            }
            Ok(false) => {}
            Err(e) => {
                error!(session_id = session.session_id, error = %e, "first-contact notification failed");
            }
        }
    }

    /// Excerpt for the first-contact notification: the logged opening
    /// message when available, otherwise the turn that triggered the alert.
    /// A notification can fire on a later turn if an earlier attempt never
    /// dispatched, so the current turn is not always the opener.
    async fn first_contact_excerpt(&self, session_id: &str, incoming: &str) -> String {
        match messages::first_user_message(&self.db, session_id).await {
            Ok(Some(message)) => message.message_text,
            Ok(None) => incoming.to_string(),
            Err(e) => {
                warn!(session_id, error = %e, "first-message lookup failed, using current turn");
                incoming.to_string()
            }
        }
    }

    async fn notify_handoff(&self, session_id: &str) {
        let history = messages::recent_messages(&self.db, session_id, self.config.history_turns as i64)
            .await
            .unwrap_or_default();
        if let Err(e) = self.notifier.send_handoff(session_id, &history).await {
            error!(session_id, error = %e, "support-request notification failed");
        }
    }

    async fn notify_stuck(&self, session_id: &str) {
        let recent = messages::recent_messages(&self.db, session_id, 3)
            .await
            .unwrap_or_default();
        if let Err(e) = self.notifier.send_stuck(session_id, &recent).await {
            error!(session_id, error = %e, "stuck notification failed");
        }
    }

    async fn active_instruction(&self) -> Option<String> {
        match instructions::get_active(&self.db).await {
            Ok(Some(active)) => Some(active.instruction_text),
            Ok(None) => self.default_instruction.clone(),
            Err(e) => {
                warn!(error = %e, "instruction lookup failed, using default");
                self.default_instruction.clone()
            }
        }
    }

    /// Append that logs instead of failing the turn. Used wherever the
    /// visitor-facing reply must survive a lost write.
    async fn try_append(
        &self,
        session_id: &str,
        role: Role,
        text: &str,
        needs_help: bool,
        confidence: Option<f64>,
    ) -> Option<Message> {
        match messages::append_message(&self.db, session_id, role, text, needs_help, confidence)
            .await
        {
            Ok(message) => Some(message),
            Err(e) => {
                error!(session_id, %role, error = %e, "message not persisted, conversation continues");
                None
            }
        }
    }
}
