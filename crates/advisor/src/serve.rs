// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `advisor serve` command implementation.
//!
//! Wires the session store, lexical retriever, Gemini provider, Telegram
//! relay, and orchestrator together, then serves the gateway until the
//! process receives a shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use advisor_agent::Orchestrator;
use advisor_config::model::AdvisorConfig;
use advisor_core::AdvisorError;
use advisor_core::traits::ChatProvider;
use advisor_gateway::auth::AuthConfig;
use advisor_gateway::server::{GatewayState, router, start_server};
use advisor_gemini::GeminiProvider;
use advisor_retrieval::{Retriever, RetrieverParams};
use advisor_storage::Database;
use advisor_telegram::api::BotApi;
use advisor_telegram::commands::CommandHandler;
use advisor_telegram::notifier::Notifier;
use tracing::{info, warn};

pub async fn run_serve(config: AdvisorConfig) -> Result<(), AdvisorError> {
    init_tracing(&config.agent.log_level);
    info!(agent = config.agent.name, "starting Advisor chat backend");

    let db = Database::open(&config.storage.database_path).await?;

    let retriever = Retriever::new(
        db.clone(),
        RetrieverParams {
            retrieval_limit: config.chat.retrieval_limit,
            document_limit: config.chat.document_limit,
            excerpt_max_chars: config.chat.excerpt_max_chars,
        },
    );

    let provider: Arc<dyn ChatProvider> = Arc::new(GeminiProvider::new(&config.gemini)?);

    let notifier = Arc::new(Notifier::new(&config.telegram)?);
    if !notifier.enabled() {
        warn!("Telegram relay not configured; escalations will only be visible in the admin console");
    }

    let bot_api = match &config.telegram.bot_token {
        Some(token) => Some(BotApi::new(token.clone())?),
        None => None,
    };
    let commands = Arc::new(CommandHandler::new(
        db.clone(),
        bot_api,
        config.telegram.chat_id.clone(),
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        db.clone(),
        retriever,
        provider,
        notifier.clone(),
        config.chat.clone(),
        config.agent.default_instruction.clone(),
    ));

    let state = GatewayState {
        db: db.clone(),
        orchestrator,
        commands,
        notifier,
        documents_dir: PathBuf::from(&config.storage.documents_dir),
    };
    let app = router(
        state,
        AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
    );

    let result = tokio::select! {
        result = start_server(&config.gateway, app) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    if let Err(e) = db.close().await {
        warn!(error = %e, "database did not close cleanly");
    }
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("advisor={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
