//! API error types and handling.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid JSON: {0}")]
    JsonRejection(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::Collaborator(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::JsonRejection(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidState(_) => "INVALID_STATE",
            ApiError::Collaborator(_) => "COLLABORATOR_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Serialization(_) => "SERIALIZATION_ERROR",
            ApiError::JsonRejection(_) => "INVALID_JSON",
        }
    }
}

impl From<risk_core::Error> for ApiError {
    fn from(err: risk_core::Error) -> Self {
        match err {
            risk_core::Error::InvalidState { .. } => ApiError::InvalidState(err.to_string()),
            risk_core::Error::Collaborator { .. } | risk_core::Error::Io(_) => {
                ApiError::Collaborator(err.to_string())
            }
            risk_core::Error::Json(e) => ApiError::Serialization(e),
            risk_core::Error::Config { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection, "JSON parsing failed");
        ApiError::JsonRejection(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log 500 errors for debugging (these indicate bugs or infrastructure issues)
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(
                error_code = self.error_code(),
                error = %self,
                "Internal server error"
            );
        }

        let body = ErrorResponse::new(self.error_code(), self.to_string());

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_maps_to_conflict() {
        let err: ApiError = risk_core::Error::InvalidState {
            operation: "resume_trading",
            current: "active".to_string(),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "INVALID_STATE");
    }

    #[test]
    fn test_collaborator_failure_maps_to_bad_gateway() {
        let err: ApiError = risk_core::Error::Collaborator {
            service: "portfolio",
            message: "unreachable".to_string(),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
