//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from retain-core errors
impl From<retain_core::RetainError> for ApiError {
    fn from(err: retain_core::RetainError) -> Self {
        use retain_core::RetainError;

        let code = err.code().as_str();
        let message = err.to_string();
        let mut details = serde_json::Map::new();
        if let Some(s) = err.suggestion() {
            details.insert("suggestion".to_string(), s.into());
        }
        if let RetainError::InvalidFeedback { value, .. } = &err {
            details.insert("value".to_string(), (*value).into());
        }

        let api = match err {
            RetainError::NotFound { .. } => ApiError::not_found(message),
            RetainError::InvalidFeedback { .. } | RetainError::Validation { .. } => {
                ApiError::validation(message)
            }
            RetainError::DuplicateQuestion { .. } | RetainError::Conflict { .. } => {
                ApiError::conflict(message)
            }
            RetainError::Configuration(msg) => ApiError::bad_request(msg),
            RetainError::Persistence { .. }
            | RetainError::Network { .. }
            | RetainError::Parse { .. }
            | RetainError::Io(_)
            | RetainError::Serialization(_)
            | RetainError::Internal(_) => {
                tracing::error!(error = %message, "Request failed");
                ApiError::internal(message)
            }
        };

        let api = ApiError { code: code.to_string(), ..api };
        if details.is_empty() {
            api
        } else {
            api.with_details(serde_json::Value::Object(details))
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
