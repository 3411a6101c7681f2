// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error envelope shared by all gateway handlers.

use advisor_core::AdvisorError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// JSON error body returned for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper mapping [`AdvisorError`] onto HTTP status codes.
pub struct ApiError(pub AdvisorError);

impl From<AdvisorError> for ApiError {
    fn from(e: AdvisorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AdvisorError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AdvisorError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("not found: {msg}")),
            AdvisorError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            other => {
                // Operators get actionable text; visitors never reach this
                // path because the orchestrator degrades internally.
                error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
