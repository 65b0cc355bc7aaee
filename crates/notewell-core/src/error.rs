//! Error types for notewell.

use thiserror::Error;

/// Result type alias using notewell's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notewell operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uniqueness violation (duplicate email, duplicate provider id)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No or invalid session/credentials
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("note 42".to_string());
        assert_eq!(err.to_string(), "Not found: note 42");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty query".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty query");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("email already registered".to_string());
        assert_eq!(err.to_string(), "Conflict: email already registered");
    }

    #[test]
    fn test_error_display_unauthenticated() {
        let err = Error::Unauthenticated("missing session token".to_string());
        assert_eq!(err.to_string(), "Unauthenticated: missing session token");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("unknown AUTH_MODE".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown AUTH_MODE");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        match err {
            Error::Database(_) => {}
            _ => panic!("Expected Database error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::NotFound("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NotFound"));
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
