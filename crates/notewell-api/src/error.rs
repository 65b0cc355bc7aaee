//! API error type and HTTP status mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

/// A single field-level validation failure, surfaced to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors produced by route handlers, mapped to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Store or other unexpected failure; logged, reported generically.
    Internal(notewell_core::Error),
    Unauthenticated(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Validation(Vec<FieldError>),
}

impl From<notewell_core::Error> for ApiError {
    fn from(err: notewell_core::Error) -> Self {
        match err {
            notewell_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            notewell_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            notewell_core::Error::Conflict(msg) => ApiError::Conflict(msg),
            notewell_core::Error::Unauthenticated(msg) => ApiError::Unauthenticated(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Internal(err) => {
                error!(error = %err, "request failed");
                // Full detail only in debug builds; production gets a
                // generic message.
                let message = if cfg!(debug_assertions) {
                    err.to_string()
                } else {
                    "internal server error".to_string()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": message })),
                )
            }
            ApiError::Unauthenticated(msg) => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": msg })),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": msg })),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            ),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "error": msg })),
            ),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Validation failed",
                    "fields": errors,
                })),
            ),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = ApiError::NotFound("Note not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = ApiError::Conflict("email already registered".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response =
            ApiError::Validation(vec![FieldError::new("email", "is required")]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_core_unauthenticated_maps_to_401() {
        let err: ApiError = notewell_core::Error::Unauthenticated("no token".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_core_internal_error_maps_to_500() {
        let err: ApiError = notewell_core::Error::Internal("boom".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
