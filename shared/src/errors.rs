/// Unified error types for the Vidgrab system.
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for request handling.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("No file was downloaded for session {session_id}")]
    OutputMissing { session_id: String },
}

impl ServiceError {
    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    /// Whether the caller caused this error (maps to a 4xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}

/// Errors touching session working directories.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create session directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove session directory {path:?}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read session directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open file {path:?}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown session {0}")]
    UnknownSession(String),
}

/// Errors reported by the extraction engine.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine exited with code {code:?}: {message}")]
    Failed { code: Option<i32>, message: String },

    #[error("Engine returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to extract video information")]
    NoInfo,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
