// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent plaintext responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::validate::ValidationError;
use crate::wire::WireError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unknown user, wrong password, and bad token all look the same.
    #[error("Authentication failed")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Integrity(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::BadRequest(msg) => format!("bad request: {msg}"),
            AppError::Unauthorized => "unauthorized".to_string(),
            AppError::Conflict(msg) => format!("conflict: {msg}"),
            AppError::NotFound(msg) => format!("not found: {msg}"),
            AppError::Integrity(msg) => {
                tracing::error!(error = %msg, "Integrity error");
                "internal error".to_string()
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "internal error".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "internal error".to_string()
            }
        };

        (status, body).into_response()
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<WireError> for AppError {
    /// A short request body is the client's fault; anything else came from
    /// storage.
    fn from(err: WireError) -> Self {
        match err {
            WireError::Truncated { .. } => AppError::BadRequest(err.to_string()),
            _ => AppError::Integrity(err.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Database("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_wire_error_mapping() {
        let truncated = WireError::Truncated {
            offset: 0,
            needed: 8,
            available: 0,
        };
        assert!(matches!(AppError::from(truncated), AppError::BadRequest(_)));

        let payload = WireError::PayloadSize {
            kind: EntityKind::Notes,
            expected: 128,
            actual: 1,
        };
        assert!(matches!(AppError::from(payload), AppError::Integrity(_)));
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err: AppError = ValidationError::MissingLength.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = AppError::Database("disk I/O error".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
