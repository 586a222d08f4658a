//! Object storage collaborators.
//!
//! The pipeline only needs two operations, fetching an object into a local
//! file and uploading a local file under a key. Both are behind the
//! [`ObjectStore`] trait so the backing service is chosen at construction:
//!
//! - [`S3Store`] - AWS S3 and S3-compatible services
//! - [`LocalStore`] - a directory tree, one subdirectory per bucket
//!
//! Key helpers derive the local file name and the `reports/` destination
//! from an incoming object key.

pub mod local;
pub mod s3;

use async_trait::async_trait;
use std::path::Path;

use crate::error::StorageResult;

pub use local::LocalStore;
pub use s3::S3Store;

/// Key prefix under which transformed reports are stored.
pub const REPORTS_PREFIX: &str = "reports/";

/// Suffix appended to the input stem to name the report file.
pub const REPORT_SUFFIX: &str = "_updated.csv";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Download `bucket/key` into `dest`.
    ///
    /// A missing bucket or object is reported as
    /// [`StorageError::NotFound`](crate::error::StorageError::NotFound).
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> StorageResult<()>;

    /// Store the file at `src` as `bucket/key`.
    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Last `/`-separated segment of an object key.
pub fn file_name_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Report file name for an input file: the text before the first `.`
/// followed by [`REPORT_SUFFIX`].
///
/// `people.2024.csv` becomes `people_updated.csv`.
pub fn report_file_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{}{}", stem, REPORT_SUFFIX)
}

/// Destination key for a report: [`REPORTS_PREFIX`] plus the last path
/// segment of `name`.
pub fn report_key(name: &str) -> String {
    format!("{}{}", REPORTS_PREFIX, file_name_from_key(name))
}
