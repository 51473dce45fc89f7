//! Error types for second-brain.

use thiserror::Error;

/// Result type alias using second-brain's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for second-brain operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Card not found
    #[error("Card not found: {0}")]
    CardNotFound(uuid::Uuid),

    /// Topic not found
    #[error("Topic not found: {0}")]
    TopicNotFound(uuid::Uuid),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No recognized session for a user-scoped action
    #[error("Not authenticated.")]
    Unauthenticated,

    /// Uploaded file rejected (unsupported type or no usable content)
    #[error("{0}")]
    UnsupportedInput(String),

    /// Operation cannot proceed from the current state
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// External document conversion failed
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_card_not_found() {
        let id = Uuid::nil();
        let err = Error::CardNotFound(id);
        assert_eq!(err.to_string(), format!("Card not found: {}", id));
    }

    #[test]
    fn test_error_display_topic_not_found() {
        let id = Uuid::new_v4();
        let err = Error::TopicNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_unauthenticated() {
        assert_eq!(Error::Unauthenticated.to_string(), "Not authenticated.");
    }

    #[test]
    fn test_unsupported_input_is_shown_verbatim() {
        let err = Error::UnsupportedInput("Unsupported file type.".to_string());
        assert_eq!(err.to_string(), "Unsupported file type.");
    }

    #[test]
    fn test_error_display_precondition() {
        let err = Error::Precondition("parent has no number".to_string());
        assert_eq!(err.to_string(), "Precondition failed: parent has no number");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
