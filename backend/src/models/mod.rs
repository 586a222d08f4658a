//! Domain models for the Reportload pipeline.
//!
//! - [`Table`] - CSV columns keyed by header name, in file order
//! - [`StorageEvent`] - Storage notification payload that triggers a run
//! - [`ObjectLocation`] - Bucket and key of the object to process
//! - [`Outcome`] - Result contract reported for each invocation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EventError;

// =============================================================================
// Table
// =============================================================================

/// In-memory representation of a CSV file, one entry per column.
///
/// Columns keep the order they were inserted in. Each column is expected to
/// hold one cell per data row, but nothing enforces equal lengths: a table
/// built from hand-assembled columns may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: IndexMap<String, Vec<String>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, cells)` pairs. A repeated name replaces the
    /// earlier column.
    pub fn from_columns<N, I, C>(columns: I) -> Self
    where
        N: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        I: IntoIterator<Item = (N, C)>,
    {
        let mut table = Self::new();
        for (name, cells) in columns {
            table.insert_column(name, cells.into_iter().map(Into::into).collect());
        }
        table
    }

    /// Insert a column, returning the cells it replaced if the name existed.
    pub fn insert_column(&mut self, name: impl Into<String>, cells: Vec<String>) -> Option<Vec<String>> {
        self.columns.insert(name.into(), cells)
    }

    /// Cells of the named column.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterate `(name, cells)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of complete rows (length of the shortest column).
    pub fn row_count(&self) -> usize {
        self.columns.values().map(Vec::len).min().unwrap_or(0)
    }

    /// True when columns differ in length.
    pub fn is_ragged(&self) -> bool {
        let mut lengths = self.columns.values().map(Vec::len);
        match lengths.next() {
            Some(first) => lengths.any(|len| len != first),
            None => false,
        }
    }
}

// =============================================================================
// Storage Notification
// =============================================================================

/// Storage notification payload, e.g. an S3 `ObjectCreated` event.
///
/// Only the fields needed to locate the object are modelled; everything
/// else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

impl StorageEvent {
    /// Parse a notification from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a single-record notification.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![EventRecord {
                s3: S3Entity {
                    bucket: BucketEntity { name: bucket.into() },
                    object: ObjectEntity { key: key.into() },
                },
            }],
        }
    }

    /// Location of the object named by the first record.
    ///
    /// The key is used exactly as delivered.
    pub fn location(&self) -> Result<ObjectLocation, EventError> {
        let record = self.records.first().ok_or(EventError::NoRecords)?;
        if record.s3.object.key.is_empty() {
            return Err(EventError::EmptyKey);
        }
        Ok(ObjectLocation {
            bucket: record.s3.bucket.name.clone(),
            key: record.s3.object.key.clone(),
        })
    }
}

/// Bucket and key of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

// =============================================================================
// Invocation Outcome
// =============================================================================

/// Status label of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Success")]
    Success,
    #[serde(rename = "There was an issue")]
    Issue,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Issue => "There was an issue",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What an invocation reports back: status, output file name, bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    pub file_name: String,
    pub bucket: String,
}

impl Outcome {
    pub fn success(file_name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            file_name: file_name.into(),
            bucket: bucket.into(),
        }
    }

    pub fn issue(file_name: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            status: Status::Issue,
            file_name: file_name.into(),
            bucket: bucket.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// The `(status label, file name, bucket)` triple.
    pub fn as_tuple(&self) -> (&'static str, &str, &str) {
        (self.status.label(), &self.file_name, &self.bucket)
    }
}
