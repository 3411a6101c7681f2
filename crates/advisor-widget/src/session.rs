// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The widget session: local transcript, token reuse, and handoff polling.

use std::sync::{Arc, Mutex, MutexGuard};

use advisor_core::AdvisorError;
use advisor_core::replies::{FORWARDED_REPLY, HANDOFF_ACK};
use advisor_core::types::{Role, Session};
use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::{WidgetClient, WidgetConfig};

/// Shown locally when a conversation has no history yet. The session row is
/// only created server-side on the first sent message.
pub const WELCOME_MESSAGE: &str =
    "Hi! I'm the course advisor. Ask me anything about our programs, pricing, or schedules.";

/// One transcript line as the embedding UI sees it.
///
/// Locally appended turns have no id until the server assigns one; merged
/// operator and model turns carry the server id.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetMessage {
    pub id: Option<i64>,
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Default)]
struct TranscriptState {
    messages: Vec<WidgetMessage>,
    /// Highest server message id already represented locally.
    cursor: i64,
    handoff_active: bool,
}

struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// An open widget conversation. Owned by the embedding UI; dropping it
/// cancels any running poll task.
pub struct WidgetSession {
    client: Arc<WidgetClient>,
    config: WidgetConfig,
    session_id: String,
    state: Arc<Mutex<TranscriptState>>,
    poll: Option<PollTask>,
}

impl WidgetSession {
    /// Open a session, reusing the stored token when the server confirms it
    /// is still live and was active within the configured expiry window.
    pub async fn open(config: WidgetConfig) -> Result<Self, AdvisorError> {
        let client = Arc::new(WidgetClient::new(&config)?);

        let stored = match &config.token_path {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|token| !token.is_empty()),
            None => None,
        };

        let reused = match &stored {
            Some(token) => match client.fetch_session(token).await {
                Ok(Some(session)) if reusable(&session, config.session_expiry_hours) => {
                    Some(session)
                }
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "token revalidation failed, starting fresh");
                    None
                }
            },
            None => None,
        };

        let mut state = TranscriptState::default();
        let session_id = match &reused {
            Some(session) => {
                match client.fetch_messages(&session.session_id, None).await {
                    Ok(history) => {
                        for message in history {
                            state.cursor = state.cursor.max(message.id);
                            state.messages.push(WidgetMessage {
                                id: Some(message.id),
                                role: message.role,
                                text: message.message_text,
                            });
                        }
                    }
                    Err(e) => warn!(error = %e, "history load failed, starting empty"),
                }
                state.handoff_active = session.handoff_active;
                session.session_id.clone()
            }
            None => Uuid::new_v4().to_string(),
        };

        if state.messages.is_empty() {
            state.messages.push(WidgetMessage {
                id: None,
                role: Role::Model,
                text: WELCOME_MESSAGE.to_string(),
            });
        }

        if let Some(path) = &config.token_path {
            if let Some(parent) = path.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            if let Err(e) = tokio::fs::write(path, &session_id).await {
                warn!(error = %e, "session token not persisted");
            }
        }

        let handoff = state.handoff_active;
        let mut widget = Self {
            client,
            config,
            session_id,
            state: Arc::new(Mutex::new(state)),
            poll: None,
        };
        if handoff {
            widget.start_polling();
        }
        Ok(widget)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of the transcript, oldest first.
    pub fn transcript(&self) -> Vec<WidgetMessage> {
        lock(&self.state).messages.clone()
    }

    pub fn handoff_active(&self) -> bool {
        lock(&self.state).handoff_active
    }

    /// Send one visitor turn and return the reply text.
    ///
    /// The visitor turn is appended optimistically and removed again if the
    /// request never reaches the gateway, so a retry does not duplicate it.
    pub async fn send(&mut self, text: &str) -> Result<String, AdvisorError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisorError::Validation("message must not be empty".into()));
        }

        lock(&self.state).messages.push(WidgetMessage {
            id: None,
            role: Role::User,
            text: text.to_string(),
        });

        let outcome = match self.client.send_chat(&self.session_id, text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                lock(&self.state).messages.pop();
                return Err(e);
            }
        };

        let handoff = outcome.handoff_active
            || outcome.response.contains(HANDOFF_ACK)
            || outcome.response == FORWARDED_REPLY;

        lock(&self.state).messages.push(WidgetMessage {
            id: None,
            role: Role::Model,
            text: outcome.response.clone(),
        });

        if handoff {
            self.sync_cursor().await;
            lock(&self.state).handoff_active = true;
            self.start_polling();
        }

        Ok(outcome.response)
    }

    /// Stop polling and invalidate the session object.
    pub fn close(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.token.cancel();
            poll.handle.abort();
        }
    }

    /// Move the poll cursor past everything already on the server, so the
    /// poll task only merges turns that arrive later.
    async fn sync_cursor(&self) {
        match self.client.fetch_messages(&self.session_id, None).await {
            Ok(history) => {
                let last = history.last().map(|m| m.id).unwrap_or(0);
                let mut state = lock(&self.state);
                state.cursor = state.cursor.max(last);
            }
            Err(e) => warn!(error = %e, "cursor sync failed, poll may repeat turns"),
        }
    }

    fn start_polling(&mut self) {
        if self.poll.is_some() {
            return;
        }
        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            self.client.clone(),
            self.session_id.clone(),
            self.state.clone(),
            self.config.poll_interval,
            token.clone(),
        ));
        self.poll = Some(PollTask { token, handle });
        debug!(session_id = self.session_id, "handoff poll started");
    }
}

impl Drop for WidgetSession {
    fn drop(&mut self) {
        self.close();
    }
}

async fn poll_loop(
    client: Arc<WidgetClient>,
    session_id: String,
    state: Arc<Mutex<TranscriptState>>,
    interval: std::time::Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match client.fetch_session(&session_id).await {
            Ok(Some(session)) if session.handoff_active => {}
            Ok(_) => {
                // Handoff ended (operator resolution); the AI takes over
                // again on the next visitor turn.
                lock(&state).handoff_active = false;
                debug!(session_id, "handoff ended, poll stopping");
                break;
            }
            Err(e) => {
                warn!(session_id, error = %e, "handoff status check failed");
                continue;
            }
        }

        let after = lock(&state).cursor;
        match client.fetch_messages(&session_id, Some(after)).await {
            Ok(new_messages) => {
                let mut state = lock(&state);
                for message in new_messages {
                    state.cursor = state.cursor.max(message.id);
                    // Visitor turns are already shown locally.
                    if message.role != Role::User {
                        state.messages.push(WidgetMessage {
                            id: Some(message.id),
                            role: message.role,
                            text: message.message_text,
                        });
                    }
                }
            }
            Err(e) => warn!(session_id, error = %e, "message poll failed"),
        }
    }
}

fn reusable(session: &Session, expiry_hours: i64) -> bool {
    if session.status == advisor_core::types::SessionStatus::Resolved || !session.is_active {
        return false;
    }
    match DateTime::parse_from_rfc3339(&session.last_activity_at) {
        Ok(last) => Utc::now().signed_duration_since(last) <= Duration::hours(expiry_hours),
        Err(_) => false,
    }
}

fn lock(state: &Mutex<TranscriptState>) -> MutexGuard<'_, TranscriptState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
