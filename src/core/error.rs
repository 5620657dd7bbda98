//! Error type system for the Chapter API
//!
//! This module provides:
//! - Error classification for the login and user management flows
//! - HTTP status code mapping
//! - JSON error bodies carrying a trace ID

use crate::api::middleware::TraceId;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the Chapter API
#[derive(Debug, thiserror::Error)]
pub enum ChapterError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task error: {0}")]
    TaskError(String),
}

impl ChapterError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChapterError::InvalidRequest(_) | ChapterError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }

            ChapterError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            ChapterError::PermissionDenied(_) => StatusCode::FORBIDDEN,

            ChapterError::NotFound(_) => StatusCode::NOT_FOUND,

            ChapterError::Conflict(_) => StatusCode::CONFLICT,

            // Signing failures are server faults; bad bearer tokens are
            // reported as AuthenticationError by the middleware.
            ChapterError::DatabaseError(_)
            | ChapterError::TokenError(_)
            | ChapterError::IoError(_)
            | ChapterError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ChapterError::DatabaseError(_) => "DatabaseError",
            ChapterError::InvalidRequest(_) => "InvalidRequest",
            ChapterError::ValidationError(_) => "ValidationError",
            ChapterError::AuthenticationError(_) => "AuthenticationError",
            ChapterError::PermissionDenied(_) => "PermissionDenied",
            ChapterError::NotFound(_) => "NotFound",
            ChapterError::Conflict(_) => "Conflict",
            ChapterError::TokenError(_) => "TokenError",
            ChapterError::IoError(_) => "IoError",
            ChapterError::TaskError(_) => "TaskError",
        }
    }

    /// Whether the message may be shown to the client as-is
    fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Trace ID of the failed request, matching the `X-Trace-Id` header
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a new error response with a specific trace ID
    pub fn with_trace_id(error: String, message: String, trace_id: String) -> Self {
        Self {
            error,
            message,
            trace_id,
        }
    }

    /// Create an error response from a ChapterError
    ///
    /// Server-side faults get a generic message so that database or key
    /// material details never reach the client.
    pub fn from_error(error: &ChapterError) -> Self {
        Self::new(error.error_type().to_string(), Self::client_message(error))
    }

    /// Create an error response from a ChapterError with a specific trace ID
    pub fn from_error_with_trace_id(error: &ChapterError, trace_id: String) -> Self {
        Self::with_trace_id(
            error.error_type().to_string(),
            Self::client_message(error),
            trace_id,
        )
    }

    fn client_message(error: &ChapterError) -> String {
        if error.is_client_error() {
            error.to_string()
        } else {
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for ChapterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = match TraceId::current() {
            Some(trace_id) => {
                ErrorResponse::from_error_with_trace_id(&self, trace_id.as_str().to_string())
            }
            None => ErrorResponse::from_error(&self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for ChapterError {
    fn from(rejection: JsonRejection) -> Self {
        ChapterError::InvalidRequest(rejection.body_text())
    }
}

/// Result type alias for operations that can fail with ChapterError
pub type Result<T> = std::result::Result<T, ChapterError>;
