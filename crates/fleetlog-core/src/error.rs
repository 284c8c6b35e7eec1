//! Error types for fleetlog.

use thiserror::Error;

/// Result type alias using fleetlog's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fleetlog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Aircraft record not found
    #[error("Aircraft record not found: {0}")]
    RecordNotFound(uuid::Uuid),

    /// Document could not be rendered to pages
    #[error("Could not read document: {0}")]
    Rasterize(String),

    /// Remote model call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model output did not match the requested schema
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Extraction retries exhausted
    #[error("Model extraction failed after {attempts} attempts: {last_error}")]
    ExtractionFailed { attempts: u32, last_error: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

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

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
