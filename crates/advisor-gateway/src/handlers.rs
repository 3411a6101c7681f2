// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Widget-facing and webhook handlers.

use advisor_core::AdvisorError;
use advisor_core::types::{Message, Session};
use advisor_storage::queries::{messages, sessions};
use advisor_telegram::commands::Update;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for `POST /v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omitted on the very first widget message; the gateway mints one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for `POST /v1/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub handoff_active: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PollQuery {
    /// Message-id cursor; only messages with a larger id are returned.
    #[serde(default)]
    pub after: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// One visitor turn. Mints a session id when the widget has none yet.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let reply = state
        .orchestrator
        .handle_message(&session_id, &request.message)
        .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id,
        handoff_active: reply.handoff_active,
    }))
}

/// Session metadata, used by the widget to revalidate a stored token.
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let session = sessions::get_session(&state.db, &session_id)
        .await?
        .ok_or_else(|| AdvisorError::NotFound(format!("session {session_id}")))?;
    Ok(Json(session))
}

/// Cursor poll for the widget: everything after the caller's last seen id.
pub async fn get_session_messages(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
    Query(query): Query<PollQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let messages = messages::list_messages(&state.db, &session_id, query.after).await?;
    Ok(Json(MessageListResponse { messages }))
}

/// Telegram webhook entry point.
///
/// Always returns 200: a non-2xx response makes Telegram redeliver the same
/// update, so parse and processing failures are logged and swallowed.
pub async fn telegram_webhook(
    State(state): State<GatewayState>,
    body: String,
) -> Json<serde_json::Value> {
    match serde_json::from_str::<Update>(&body) {
        Ok(update) => {
            if let Err(e) = state.commands.handle_update(update).await {
                error!(error = %e, "webhook update processing failed");
            }
        }
        Err(e) => {
            warn!(error = %e, "ignoring malformed webhook payload");
        }
    }
    Json(serde_json::json!({ "ok": true }))
}
