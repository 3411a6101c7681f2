// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server startup.

use std::path::PathBuf;
use std::sync::Arc;

use advisor_agent::Orchestrator;
use advisor_config::model::GatewayConfig;
use advisor_core::AdvisorError;
use advisor_storage::Database;
use advisor_telegram::Notifier;
use advisor_telegram::commands::CommandHandler;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::admin;
use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub orchestrator: Arc<Orchestrator>,
    pub commands: Arc<CommandHandler>,
    pub notifier: Arc<Notifier>,
    /// Blob directory for uploaded knowledge documents.
    pub documents_dir: PathBuf,
}

/// Build the full application router.
///
/// The health check and the Telegram webhook stay outside the auth
/// middleware: Telegram cannot send a bearer token, and the webhook is
/// instead guarded by the allow-listed chat id in the command handler.
pub fn router(state: GatewayState, auth: AuthConfig) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/telegram/webhook", post(handlers::telegram_webhook));

    let widget = Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/sessions/{session_id}", get(handlers::get_session))
        .route(
            "/v1/sessions/{session_id}/messages",
            get(handlers::get_session_messages),
        );

    let admin_api = Router::new()
        .route("/v1/admin/sessions", get(admin::list_sessions))
        .route(
            "/v1/admin/sessions/{session_id}/resolve",
            post(admin::resolve_session),
        )
        .route(
            "/v1/admin/sessions/{session_id}/messages",
            get(admin::session_history),
        )
        .route(
            "/v1/admin/knowledge",
            get(admin::list_knowledge).post(admin::create_knowledge),
        )
        .route(
            "/v1/admin/knowledge/{id}",
            put(admin::update_knowledge).delete(admin::delete_knowledge),
        )
        .route(
            "/v1/admin/documents",
            get(admin::list_documents).post(admin::upload_document),
        )
        .route("/v1/admin/documents/{id}", delete(admin::delete_document))
        .route(
            "/v1/admin/instructions",
            get(admin::list_instructions).post(admin::create_instruction),
        )
        .route(
            "/v1/admin/instructions/{id}/activate",
            post(admin::activate_instruction),
        )
        .route("/v1/admin/telegram/test", post(admin::telegram_test))
        // Base64 inflates the 10 MB document cap by a third; the size check
        // itself happens in the upload handler so oversized documents get a
        // JSON error instead of a bare 413.
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024));

    let protected = widget
        .merge(admin_api)
        .layer(axum_middleware::from_fn_with_state(auth, auth_middleware));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(config: &GatewayConfig, app: Router) -> Result<(), AdvisorError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AdvisorError::Internal(format!("cannot bind {addr}: {e}")))?;
    info!("Gateway server listening on {addr}");
    axum::serve(listener, app)
        .await
        .map_err(|e| AdvisorError::Internal(format!("server error: {e}")))
}
