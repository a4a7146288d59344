// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Unknown errors keep their detail internal: the caller sees a generic
/// message while the full context is logged at the response boundary.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - rejected input
    Validation(String),

    // 400 Bad Request - label storage is full
    Capacity(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden - ownership mismatch or unsupported project type
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict - project quota exceeded
    Conflict(String),

    // 500 Internal Server Error - detail withheld from the caller
    Unknown(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Capacity(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg) => msg,
            ApiError::Capacity(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            // Internal detail never reaches the caller on a 500
            ApiError::Unknown(_) => "Unexpected server error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn capacity(message: impl Into<String>) -> Self {
        ApiError::Capacity(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    /// Ownership mismatch / role failures share one wire message
    pub fn invalid_access() -> Self {
        ApiError::Forbidden("Invalid access".to_string())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found".to_string())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        ApiError::Unknown(detail.into())
    }
}

// Store failures carry a recognizable validation marker; everything else is
// surfaced generically and logged with full context.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(msg) => ApiError::Validation(msg),
            StoreError::Capacity => ApiError::Capacity("No room for the label".to_string()),
            other => ApiError::Unknown(other.to_string()),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Unknown(detail) = &self {
            tracing::error!(detail = %detail, "Server error");
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
