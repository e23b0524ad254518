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
#[derive(Error, Debug)]
pub enum AppError {
    /// Request did not contain a usable image file
    #[error("No image uploaded: {0}")]
    Upload(String),

    /// Network or provider failure while calling the language model
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// Model response did not match the expected structured shape
    #[error("Model response failed validation: {0}")]
    SchemaValidation(String),

    /// PDF generation failure
    #[error("Document rendering failed: {0}")]
    Render(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable tag for the error kind.
    ///
    /// Surfaced in the JSON error body so clients can tell which stage
    /// failed without seeing prompts, credentials, or raw model output.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Upload(_) => "upload",
            AppError::ModelInvocation(_) => "model_invocation",
            AppError::SchemaValidation(_) => "schema_validation",
            AppError::Render(_) => "render",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::ModelInvocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SchemaValidation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
