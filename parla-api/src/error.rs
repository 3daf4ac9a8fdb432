//! API error types and HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP clients. Messages here are client-facing;
/// tool output and stack detail stay in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Common(#[from] parla_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Client-facing translation of pipeline failures. Tool names appear in
/// messages; tool output does not.
impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::QuizNotFound { kind, id } => {
                ApiError::NotFound(format!("No {} quiz with id {}", kind, id))
            }
            PipelineError::MissingAudio => {
                ApiError::BadRequest("No audio file in request".to_string())
            }
            PipelineError::Launch { tool, .. } => {
                ApiError::Internal(format!("{} is not available", tool))
            }
            PipelineError::ToolFailure { tool, .. } => {
                ApiError::Internal(format!("{} failed", tool))
            }
            PipelineError::Timeout { tool, limit } => ApiError::Timeout(format!(
                "{} did not finish within {}s",
                tool,
                limit.as_secs()
            )),
            PipelineError::Persistence(_) => {
                ApiError::Internal("Failed to record attempt".to_string())
            }
            PipelineError::FileMissing { .. } | PipelineError::Io(_) => {
                ApiError::Internal("Audio processing failed".to_string())
            }
        }
    }
}
