//! Error types for the Plata client library.

use crate::validation::ValidationError;

/// All errors that can occur when using the Plata client.
#[derive(Debug, thiserror::Error)]
pub enum PlataError {
    /// HTTP transport failed (connection, TLS, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error body returned by the backend, if any.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A write was rejected before any remote call was attempted.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An operation requiring an authenticated user was called without
    /// a session.
    #[error("no active session")]
    NoSession,

    /// In-memory state became unusable (poisoned lock).
    #[error("state error: {0}")]
    State(String),
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, PlataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = PlataError::from(serde_err);
        assert!(matches!(err, PlataError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    #[test]
    fn error_api_display() {
        let err = PlataError::Api {
            status: 403,
            message: "row-level security".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("row-level security"));
    }

    #[test]
    fn error_from_validation() {
        let err = PlataError::from(ValidationError::NonPositiveAmount);
        assert!(matches!(err, PlataError::Validation(_)));
        assert!(err.to_string().contains("validation error"));
    }

    #[test]
    fn error_no_session_display() {
        assert!(PlataError::NoSession.to_string().contains("session"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PlataError>();
    }
}
