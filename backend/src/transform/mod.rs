//! Transformation module.
//!
//! - Columns: rename, clean and reorder to the report schema
//! - Writer: report to CSV
//! - Pipeline: fetch, transform, write and upload one object

pub mod columns;
pub mod pipeline;
pub mod writer;

pub use columns::*;
pub use pipeline::*;
pub use writer::*;
