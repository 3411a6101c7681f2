// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end router tests against a temporary database and a stubbed
//! LLM provider.

use std::path::PathBuf;
use std::sync::Arc;

use advisor_agent::Orchestrator;
use advisor_config::model::{ChatConfig, TelegramConfig};
use advisor_core::AdvisorError;
use advisor_core::traits::{ChatPrompt, ChatProvider};
use advisor_gateway::auth::AuthConfig;
use advisor_gateway::server::{GatewayState, router};
use advisor_retrieval::{Retriever, RetrieverParams};
use advisor_storage::Database;
use advisor_telegram::Notifier;
use advisor_telegram::commands::CommandHandler;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tower::ServiceExt;

const STUB_REPLY: &str = "Our flagship course covers applied machine learning in depth.";

struct StubProvider;

#[async_trait::async_trait]
impl ChatProvider for StubProvider {
    async fn generate(&self, _prompt: &ChatPrompt) -> Result<String, AdvisorError> {
        Ok(STUB_REPLY.to_string())
    }
}

async fn test_state(dir: &tempfile::TempDir) -> GatewayState {
    let db_path = dir.path().join("advisor.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    let chat = ChatConfig::default();
    let retriever = Retriever::new(
        db.clone(),
        RetrieverParams {
            retrieval_limit: chat.retrieval_limit,
            document_limit: chat.document_limit,
            excerpt_max_chars: chat.excerpt_max_chars,
        },
    );
    let notifier = Arc::new(Notifier::new(&TelegramConfig::default()).unwrap());
    let orchestrator = Arc::new(Orchestrator::new(
        db.clone(),
        retriever,
        Arc::new(StubProvider),
        notifier.clone(),
        chat,
        None,
    ));
    let commands = Arc::new(CommandHandler::new(db.clone(), None, None));
    GatewayState {
        db,
        orchestrator,
        commands,
        notifier,
        documents_dir: dir.path().join("documents"),
    }
}

async fn open_router(dir: &tempfile::TempDir) -> Router {
    router(test_state(dir).await, AuthConfig { bearer_token: None })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_is_open_and_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn chat_mints_a_session_id_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "Tell me about the courses" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], STUB_REPLY);
    assert_eq!(body["handoff_active"], false);
    assert!(!body["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn chat_rejects_empty_messages() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "   ", "session_id": "s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message must not be empty");
}

#[tokio::test]
async fn polling_honors_the_after_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, _) = send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "hello there", "session_id": "poll-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/v1/sessions/poll-1/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "model");

    let first_id = messages[0]["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/v1/sessions/poll-1/messages?after={first_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rest = body["messages"].as_array().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["role"], "model");
}

#[tokio::test]
async fn session_metadata_supports_token_revalidation() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, _) = send(&app, "GET", "/v1/sessions/unknown-token", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "hello", "session_id": "tok-1" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/v1/sessions/tok-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "tok-1");
    assert_eq!(body["status"], "active");
    assert!(body["last_activity_at"].as_str().is_some());
}

#[tokio::test]
async fn webhook_returns_200_even_for_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/telegram/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("this is not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A well-formed but uninteresting update is also a 200 no-op.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/telegram/webhook",
        Some(json!({ "message": { "chat": { "id": 42 }, "text": "hi" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn bearer_auth_guards_widget_and_admin_but_not_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(
        test_state(&dir).await,
        AuthConfig {
            bearer_token: Some("sekrit".to_string()),
        },
    );

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "hi", "session_id": "s" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/v1/admin/sessions", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/admin/sessions")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/admin/sessions")
        .header(header::AUTHORIZATION, "Bearer sekrit")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_sessions_filter_and_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "hello", "session_id": "sess-a" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/v1/admin/sessions?status=active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "POST", "/v1/admin/sessions/sess-a/resolve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resolved");
    assert_eq!(body["handoff_active"], false);

    let (status, body) = send(&app, "GET", "/v1/admin/sessions?status=active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["sessions"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/v1/admin/sessions?status=all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/v1/admin/sessions?status=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/v1/admin/sessions/missing/resolve", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_session_history_returns_full_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "first question", "session_id": "hist-1" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/v1/chat",
        Some(json!({ "message": "second question", "session_id": "hist-1" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/v1/admin/sessions/hist-1/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 4);

    let (status, _) = send(&app, "GET", "/v1/admin/sessions/nope/messages", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn knowledge_crud_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, created) = send(
        &app,
        "POST",
        "/v1/admin/knowledge",
        Some(json!({
            "title": "Pricing",
            "content": "The full course costs 500 euros.",
            "tags": ["price", "payment"],
            "priority": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["priority"], 5);

    let (status, listed) = send(&app, "GET", "/v1/admin/knowledge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/v1/admin/knowledge/{id}"),
        Some(json!({
            "title": "Pricing 2026",
            "content": "The full course costs 550 euros.",
            "priority": 7
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Pricing 2026");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/v1/admin/knowledge/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/admin/knowledge/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn knowledge_create_rejects_blank_fields() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/admin/knowledge",
        Some(json!({ "title": "  ", "content": "something" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title must not be empty");
}

#[tokio::test]
async fn document_upload_validates_kind_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let documents_dir: PathBuf = state.documents_dir.clone();
    let app = router(state, AuthConfig { bearer_token: None });

    let (status, body) = send(
        &app,
        "POST",
        "/v1/admin/documents",
        Some(json!({
            "title": "Notes",
            "file_name": "notes.txt",
            "content_base64": BASE64.encode(b"plain text")
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unsupported file type"));
    // Rejected uploads leave no blob behind.
    assert!(!documents_dir.exists());
}

#[tokio::test]
async fn oversized_document_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let documents_dir: PathBuf = state.documents_dir.clone();
    let app = router(state, AuthConfig { bearer_token: None });

    let eleven_mb = vec![0u8; 11 * 1024 * 1024];
    let (status, body) = send(
        &app,
        "POST",
        "/v1/admin/documents",
        Some(json!({
            "title": "Huge",
            "file_name": "huge.pdf",
            "content_base64": BASE64.encode(&eleven_mb)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("10 MB"));
    assert!(!documents_dir.exists());
}

#[tokio::test]
async fn document_upload_and_delete_manage_the_blob() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let documents_dir: PathBuf = state.documents_dir.clone();
    let app = router(state, AuthConfig { bearer_token: None });

    let (status, created) = send(
        &app,
        "POST",
        "/v1/admin/documents",
        Some(json!({
            "title": "Course brochure",
            "file_name": "brochure.PDF",
            "content_base64": BASE64.encode(b"%PDF-1.4 brochure body"),
            "extracted_text": "The course runs for twelve weeks."
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["file_kind"], "pdf");
    let blob_path = PathBuf::from(created["file_path"].as_str().unwrap());
    assert!(blob_path.starts_with(&documents_dir));
    assert!(blob_path.exists());

    let id = created["id"].as_str().unwrap();
    let (status, body) = send(&app, "DELETE", &format!("/v1/admin/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
    assert!(!blob_path.exists());

    let (status, _) = send(&app, "DELETE", "/v1/admin/documents/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn instructions_keep_a_single_active_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, first) = send(
        &app,
        "POST",
        "/v1/admin/instructions",
        Some(json!({ "instruction_text": "Be brief.", "created_by": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["is_active"], true);

    let (status, second) = send(
        &app,
        "POST",
        "/v1/admin/instructions",
        Some(json!({ "instruction_text": "Be thorough." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["is_active"], true);

    let (status, listed) = send(&app, "GET", "/v1/admin/instructions", None).await;
    assert_eq!(status, StatusCode::OK);
    let versions = listed.as_array().unwrap();
    assert_eq!(versions.len(), 2);
    let active: Vec<_> = versions
        .iter()
        .filter(|v| v["is_active"] == true)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["instruction_text"], "Be thorough.");

    let first_id = first["id"].as_str().unwrap();
    let (status, reactivated) = send(
        &app,
        "POST",
        &format!("/v1/admin/instructions/{first_id}/activate"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reactivated["instruction_text"], "Be brief.");

    let (status, _) = send(&app, "POST", "/v1/admin/instructions/nope/activate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn telegram_test_reports_unconfigured_relay() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_router(&dir).await;

    let (status, body) = send(&app, "POST", "/v1/admin/telegram/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], false);
}
