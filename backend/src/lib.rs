//! # Reportload - project export reshaping for storage buckets
//!
//! When a CSV export lands in a bucket, Reportload downloads it, renames,
//! cleans and reorders its columns into a fixed report schema, and uploads
//! the result under `reports/` in the same bucket.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ Notification │────▶│    Fetch    │────▶│  Transform  │────▶│ reports/*.csv│
//! │ (bucket/key) │     │ (S3/local)  │     │  (columns)  │     │   (upload)   │
//! └──────────────┘     └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reportload::{parse_csv, transform};
//!
//! let table = parse_csv(&std::fs::read_to_string("people.csv")?)?;
//! let report = transform(&table)?;
//! for row in report.rows() {
//!     println!("{}", row.join(","));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment settings
//! - [`models`] - Table, notification and outcome types
//! - [`parser`] - CSV parsing with encoding detection
//! - [`transform`] - Column transformer, CSV writer and pipeline
//! - [`storage`] - Object store collaborators
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Object storage
pub mod storage;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError, CsvError, EventError, PipelineError, ServerError, StorageError, TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ObjectLocation, Outcome, Status, StorageEvent, Table};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_encoding, parse_bytes_auto, parse_csv, parse_csv_file_auto,
    ParseResult,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::columns::{
    rename_columns, strip_trailing_digit, transform, Report, Rows, OUTPUT_COLUMNS,
    REQUIRED_COLUMNS,
};
pub use transform::pipeline::{transform_file, Handler, TransformSummary};
pub use transform::writer::{report_to_bytes, write_report, write_report_file};

// =============================================================================
// Re-exports - Storage
// =============================================================================

pub use storage::{
    file_name_from_key, report_file_name, report_key, LocalStore, ObjectStore, S3Store,
    REPORTS_PREFIX,
};

// =============================================================================
// Re-exports - Configuration & API
// =============================================================================

pub use config::{Settings, StoreKind};
pub use api::types::{error_response, OutcomeResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
