// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin console handlers: session triage, knowledge base, documents, and
//! system instruction versioning.
//!
//! Unlike the widget surface, read failures here surface as 5xx envelopes.
//! An operator must see that data may be incomplete; a silent empty list
//! would hide a broken store.

use std::str::FromStr;

use advisor_core::AdvisorError;
use advisor_core::types::{
    FileKind, KnowledgeDocument, KnowledgeEntry, MAX_DOCUMENT_BYTES, Message, Session,
    SessionStatus, SystemInstruction,
};
use advisor_storage::queries::{documents, instructions, knowledge, messages, sessions};
use axum::Json;
use axum::extract::{Path, Query, State};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Default and maximum page size for session listings.
const SESSION_LIST_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    /// `active`, `needs_help`, `resolved`, or `all` (default).
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeEntryRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct DocumentUploadRequest {
    pub title: String,
    /// Original filename; the extension decides the file kind.
    pub file_name: String,
    /// Raw file bytes, standard base64.
    pub content_base64: String,
    /// Text extracted client-side. Documents without it are stored but
    /// never retrieved.
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstructionRequest {
    pub instruction_text: String,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct TelegramTestResponse {
    /// False when the relay is not configured.
    pub delivered: bool,
}

fn default_true() -> bool {
    true
}

// -- sessions ---------------------------------------------------------------

pub async fn list_sessions(
    State(state): State<GatewayState>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let filter = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => Some(SessionStatus::from_str(raw).map_err(|_| {
            AdvisorError::Validation(format!("unknown status filter: {raw}"))
        })?),
    };
    let sessions = sessions::list_sessions(&state.db, filter, SESSION_LIST_LIMIT).await?;
    Ok(Json(SessionListResponse { sessions }))
}

pub async fn resolve_session(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let changed = sessions::set_status(&state.db, &session_id, SessionStatus::Resolved).await?;
    if !changed {
        return Err(AdvisorError::NotFound(format!("session {session_id}")).into());
    }
    info!(session_id, "session resolved by operator");
    let session = sessions::get_session(&state.db, &session_id)
        .await?
        .ok_or_else(|| AdvisorError::NotFound(format!("session {session_id}")))?;
    Ok(Json(session))
}

pub async fn session_history(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageListResponse>, ApiError> {
    if sessions::get_session(&state.db, &session_id).await?.is_none() {
        return Err(AdvisorError::NotFound(format!("session {session_id}")).into());
    }
    let messages = messages::list_messages(&state.db, &session_id, None).await?;
    Ok(Json(MessageListResponse { messages }))
}

// -- knowledge entries ------------------------------------------------------

pub async fn list_knowledge(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<KnowledgeEntry>>, ApiError> {
    Ok(Json(knowledge::list_entries(&state.db).await?))
}

pub async fn create_knowledge(
    State(state): State<GatewayState>,
    Json(request): Json<KnowledgeEntryRequest>,
) -> Result<Json<KnowledgeEntry>, ApiError> {
    validate_entry(&request)?;
    let entry = knowledge::create_entry(
        &state.db,
        request.title.trim(),
        &request.content,
        request.category.as_deref(),
        &request.tags,
        request.priority,
    )
    .await?;
    Ok(Json(entry))
}

pub async fn update_knowledge(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(request): Json<KnowledgeEntryRequest>,
) -> Result<Json<KnowledgeEntry>, ApiError> {
    validate_entry(&request)?;
    let entry = knowledge::update_entry(
        &state.db,
        &id,
        request.title.trim(),
        &request.content,
        request.category.as_deref(),
        &request.tags,
        request.priority,
        request.is_active,
    )
    .await?
    .ok_or_else(|| AdvisorError::NotFound(format!("knowledge entry {id}")))?;
    Ok(Json(entry))
}

pub async fn delete_knowledge(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = knowledge::delete_entry(&state.db, &id).await?;
    if !deleted {
        return Err(AdvisorError::NotFound(format!("knowledge entry {id}")).into());
    }
    Ok(Json(DeletedResponse { deleted }))
}

fn validate_entry(request: &KnowledgeEntryRequest) -> Result<(), AdvisorError> {
    if request.title.trim().is_empty() {
        return Err(AdvisorError::Validation("title must not be empty".into()));
    }
    if request.content.trim().is_empty() {
        return Err(AdvisorError::Validation("content must not be empty".into()));
    }
    Ok(())
}

// -- documents --------------------------------------------------------------

pub async fn list_documents(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<KnowledgeDocument>>, ApiError> {
    Ok(Json(documents::list_documents(&state.db).await?))
}

/// Upload a knowledge document. Kind and size are validated before any
/// blob is written, so a rejected upload leaves no file behind.
pub async fn upload_document(
    State(state): State<GatewayState>,
    Json(request): Json<DocumentUploadRequest>,
) -> Result<Json<KnowledgeDocument>, ApiError> {
    if request.title.trim().is_empty() {
        return Err(AdvisorError::Validation("title must not be empty".into()).into());
    }
    let extension = request
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    let kind = FileKind::from_str(&extension).map_err(|_| {
        AdvisorError::Validation(format!(
            "unsupported file type: {} (allowed: pdf, doc, docx)",
            request.file_name
        ))
    })?;
    let bytes = BASE64.decode(&request.content_base64).map_err(|_| {
        AdvisorError::Validation("content_base64 is not valid base64".into())
    })?;
    if bytes.is_empty() {
        return Err(AdvisorError::Validation("document is empty".into()).into());
    }
    if bytes.len() as i64 > MAX_DOCUMENT_BYTES {
        return Err(AdvisorError::Validation(format!(
            "document exceeds the {} MB limit",
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        ))
        .into());
    }

    let blob_name = format!("{}.{extension}", Uuid::new_v4());
    let blob_path = state.documents_dir.join(&blob_name);
    tokio::fs::create_dir_all(&state.documents_dir)
        .await
        .map_err(|e| AdvisorError::Internal(format!("cannot create documents dir: {e}")))?;
    tokio::fs::write(&blob_path, &bytes)
        .await
        .map_err(|e| AdvisorError::Internal(format!("cannot write document blob: {e}")))?;

    let document = documents::create_document(
        &state.db,
        request.title.trim(),
        &blob_path.to_string_lossy(),
        kind,
        bytes.len() as i64,
        request.extracted_text.as_deref(),
        request.category.as_deref(),
        &request.tags,
    )
    .await?;
    info!(id = %document.id, kind = %kind, size = bytes.len(), "document uploaded");
    Ok(Json(document))
}

pub async fn delete_document(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Some(blob_path) = documents::delete_document(&state.db, &id).await? else {
        return Err(AdvisorError::NotFound(format!("document {id}")).into());
    };
    // The row is gone either way; a stale blob is an orphan, not an error.
    if let Err(e) = tokio::fs::remove_file(&blob_path).await {
        warn!(id, blob_path, error = %e, "document blob not removed");
    }
    Ok(Json(DeletedResponse { deleted: true }))
}

// -- system instructions ----------------------------------------------------

pub async fn list_instructions(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<SystemInstruction>>, ApiError> {
    Ok(Json(instructions::list_instructions(&state.db).await?))
}

pub async fn create_instruction(
    State(state): State<GatewayState>,
    Json(request): Json<InstructionRequest>,
) -> Result<Json<SystemInstruction>, ApiError> {
    if request.instruction_text.trim().is_empty() {
        return Err(AdvisorError::Validation("instruction text must not be empty".into()).into());
    }
    let instruction = instructions::insert_and_activate(
        &state.db,
        request.instruction_text.trim(),
        request.created_by.as_deref(),
    )
    .await?;
    info!(id = %instruction.id, "new system instruction activated");
    Ok(Json(instruction))
}

pub async fn activate_instruction(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<SystemInstruction>, ApiError> {
    let activated = instructions::activate(&state.db, &id).await?;
    if !activated {
        return Err(AdvisorError::NotFound(format!("instruction {id}")).into());
    }
    let instruction = instructions::get_active(&state.db)
        .await?
        .ok_or_else(|| AdvisorError::Internal("activated instruction not readable".into()))?;
    Ok(Json(instruction))
}

// -- relay ------------------------------------------------------------------

/// Settings-page connectivity check for the escalation relay.
pub async fn telegram_test(
    State(state): State<GatewayState>,
) -> Result<Json<TelegramTestResponse>, ApiError> {
    let delivered = state.notifier.send_test().await?;
    Ok(Json(TelegramTestResponse { delivered }))
}
