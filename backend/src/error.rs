//! Error types for the Reportload pipeline.
//!
//! - [`CsvError`] - CSV decoding and parsing errors
//! - [`TransformError`] - Column transformation errors
//! - [`StorageError`] - Object store fetch/upload errors
//! - [`EventError`] - Notification payload errors
//! - [`ConfigError`] - Environment configuration errors
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Conversion into [`PipelineError`] is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Two header cells share a name.
    #[error("Duplicate column in header: {0}")]
    DuplicateHeader(String),

    /// Writing the output CSV failed.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => CsvError::IoError(io),
            _ => CsvError::ParseError { line, message },
        }
    }
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during column transformation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// Missing required source column.
    #[error("Missing source column: {0}")]
    MissingColumn(String),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from the object store collaborators.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The bucket or object does not exist.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Any other service or network failure.
    #[error("Storage request failed: {0}")]
    Transport(String),

    /// Local file handling failed.
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// True for "not found" class errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

// =============================================================================
// Event Errors
// =============================================================================

/// Errors while resolving a storage notification.
#[derive(Debug, Error)]
pub enum EventError {
    /// The payload carried no records.
    #[error("Notification contains no records")]
    NoRecords,

    /// The object key is empty.
    #[error("Notification record has an empty object key")]
    EmptyKey,

    /// The payload is not a valid notification.
    #[error("Invalid notification payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value we cannot use.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Notification error.
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Local filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking worker task panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
