//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
///
/// The original system treated every failure as a silent no-op; the typed
/// variants here distinguish "not found" from "busy" from real failures.
#[derive(Error, Debug)]
pub enum AppError {
    /// Agent with the given ID was not found in the registry
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Agent is already running and cannot be started again
    #[error("Agent is busy: {0}")]
    AgentBusy(String),

    /// No workflow preset exists under the given name
    #[error("Unknown workflow: {0}")]
    WorkflowUnknown(String),

    /// Request payload failed validation (empty query, oversized input, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Uploaded policy document has an unsupported file extension
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A question was asked before any policy document was uploaded
    #[error("No policy documents have been uploaded yet")]
    NoPolicyDocuments,

    /// The upstream language-model API returned a failure
    #[error("Upstream API error: {0}")]
    UpstreamApi(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AgentNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AgentBusy(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::WorkflowUnknown(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UnsupportedFileType(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NoPolicyDocuments => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UpstreamApi(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::AgentNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (AppError::AgentBusy("x".into()), StatusCode::CONFLICT),
            (
                AppError::WorkflowUnknown("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::InvalidRequest("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::NoPolicyDocuments, StatusCode::BAD_REQUEST),
            (AppError::UpstreamApi("x".into()), StatusCode::BAD_GATEWAY),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_display_messages() {
        let err = AppError::AgentNotFound("policy-agent".to_string());
        assert_eq!(err.to_string(), "Agent not found: policy-agent");

        let err = AppError::AgentBusy("quality-agent".to_string());
        assert_eq!(err.to_string(), "Agent is busy: quality-agent");
    }
}
