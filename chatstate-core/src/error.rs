//! Error types for chatstate

use thiserror::Error;

/// The main error type for chatstate operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The assistant id is not a usable storage key
    #[error("Invalid assistant id: {0}")]
    InvalidIdentity(String),

    /// No session has been created for the assistant id
    #[error("No session exists for assistant id: {0}")]
    SessionNotFound(String),

    /// The conversation log collaborator failed; not retried here
    #[error("Storage unavailable during {operation}: {message}")]
    StorageUnavailable {
        operation: &'static str,
        message: String,
    },

    /// The inference collaborator failed; the prompt stays recorded
    #[error("Inference failed during {operation}: {message}")]
    InferenceFailure {
        operation: &'static str,
        message: String,
    },
}

impl Error {
    /// Wrap a storage collaborator failure, tagged with the failing operation
    pub fn storage(operation: &'static str, source: impl std::fmt::Display) -> Self {
        Error::StorageUnavailable {
            operation,
            message: source.to_string(),
        }
    }

    /// Wrap an inference collaborator failure, tagged with the failing operation
    pub fn inference(operation: &'static str, source: impl std::fmt::Display) -> Self {
        Error::InferenceFailure {
            operation,
            message: source.to_string(),
        }
    }
}

/// A specialized Result type for chatstate operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
