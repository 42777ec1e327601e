use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these;
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "NOT_FOUND", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. Conflicts and validation failures also carry the
/// offending field so a form can highlight it:
///
/// ```json
/// {"code": "ALREADY_EXISTS", "message": "cpuSerial 'CPU-001' already exists",
///  "field": "cpuSerial", "value": "CPU-001"}
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Referenced resource does not exist. HTTP 404.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// Uniqueness violation on a field. HTTP 409.
    #[error("{field} '{value}' already exists")]
    Conflict { field: String, value: String },

    /// Input data is invalid. HTTP 400.
    #[error("{field} {reason}")]
    Validation { field: String, reason: String },

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(kind: &str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            kind: kind.to_string(),
            id: id.into(),
        }
    }

    pub fn conflict(field: &str, value: impl Into<String>) -> Self {
        ServiceError::Conflict {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound { .. } => error_code::NOT_FOUND,
            ServiceError::Conflict { .. } => error_code::ALREADY_EXISTS,
            ServiceError::Validation { .. } => error_code::VALIDATION_FAILED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ServiceError::Storage(detail) => {
                error!("storage failure: {}", detail);
                "storage unavailable".to_string()
            }
            ServiceError::Internal(detail) => {
                error!("internal error: {}", detail);
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let mut body = serde_json::json!({
            "code": self.error_code(),
            "message": message,
        });
        match &self {
            ServiceError::Conflict { field, value } => {
                body["field"] = serde_json::json!(field);
                body["value"] = serde_json::json!(value);
            }
            ServiceError::Validation { field, .. } => {
                body["field"] = serde_json::json!(field);
            }
            _ => {}
        }
        (status, axum::Json(body)).into_response()
    }
}
