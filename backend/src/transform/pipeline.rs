//! Event-driven pipeline: fetch → transform → write → upload.
//!
//! # Example
//!
//! ```rust,ignore
//! use reportload::{Handler, LocalStore, ObjectLocation};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = Handler::new(Arc::new(LocalStore::new("./buckets")), "/tmp");
//!     let outcome = handler
//!         .handle(&ObjectLocation::new("exports", "incoming/people.csv"))
//!         .await?;
//!
//!     println!("{:?}", outcome.as_tuple());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::columns::transform;
use super::writer::write_report_file;
use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{ObjectLocation, Outcome, StorageEvent};
use crate::parser::parse_csv_file_auto;
use crate::storage::{file_name_from_key, report_file_name, report_key, ObjectStore};

/// What a local transformation produced.
#[derive(Debug, Clone, Serialize)]
pub struct TransformSummary {
    /// Detected input encoding
    pub encoding: String,
    /// Input column headers
    pub headers: Vec<String>,
    /// Data rows read from the input
    pub input_rows: usize,
    /// Data rows written (header excluded)
    pub output_rows: usize,
    /// Whether ragged columns were cut to the shortest
    pub truncated: bool,
}

/// Parse `input`, transform it and write the report to `output`.
///
/// Nothing is written when parsing or the transformation fails.
pub fn transform_file(input: &Path, output: &Path) -> PipelineResult<TransformSummary> {
    let parsed = parse_csv_file_auto(input)?;
    let report = transform(&parsed.table)?;
    let written = write_report_file(&report, output)?;

    Ok(TransformSummary {
        encoding: parsed.encoding,
        headers: parsed.headers,
        input_rows: parsed.row_count,
        output_rows: written.saturating_sub(1),
        truncated: report.is_truncated(),
    })
}

/// Processes storage notifications against an injected object store.
///
/// Each call works in its own directory under `work_dir`, so concurrent
/// invocations never share files.
#[derive(Clone)]
pub struct Handler {
    store: Arc<dyn ObjectStore>,
    work_dir: PathBuf,
}

impl Handler {
    pub fn new(store: Arc<dyn ObjectStore>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            work_dir: work_dir.into(),
        }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Resolve the notification's first record and process it.
    pub async fn handle_event(&self, event: &StorageEvent) -> PipelineResult<Outcome> {
        let location = event.location()?;
        self.handle(&location).await
    }

    /// Process one object.
    ///
    /// Fetch, parse and transform failures are logged and reported as an
    /// issue outcome. An upload rejected as not found is logged and still
    /// counts as success. Any other upload failure is returned as an error.
    pub async fn handle(&self, location: &ObjectLocation) -> PipelineResult<Outcome> {
        let file_name = file_name_from_key(&location.key).to_string();
        let output_name = report_file_name(&file_name);
        let run_dir = self.work_dir.join(format!("reportload-{}", Uuid::new_v4()));

        log_info(format!("📥 Getting {} from the {} bucket...", location.key, location.bucket));

        let result = self.run(location, &run_dir, &file_name, &output_name).await;

        if let Err(e) = tokio::fs::remove_dir_all(&run_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                log_warning(format!("Could not clean {}: {}", run_dir.display(), e));
            }
        }

        result
    }

    async fn run(
        &self,
        location: &ObjectLocation,
        run_dir: &Path,
        file_name: &str,
        output_name: &str,
    ) -> PipelineResult<Outcome> {
        let issue = || Outcome::issue(output_name, &location.bucket);

        tokio::fs::create_dir_all(run_dir).await?;
        let input_path = run_dir.join(if file_name.is_empty() { "input.csv" } else { file_name });
        let output_path = run_dir.join(output_name);

        if let Err(e) = self.store.fetch(&location.bucket, &location.key, &input_path).await {
            if e.is_not_found() {
                log_error(format!("The object {} does not exist", location));
            } else {
                log_error(format!("Fetch from {} store failed: {}", self.store.name(), e));
            }
            return Ok(issue());
        }
        log_success(format!("Fetched {}", location));

        log_info("⚙️  Transforming columns...");
        let (input, output) = (input_path.clone(), output_path.clone());
        let summary = match tokio::task::spawn_blocking(move || transform_file(&input, &output)).await? {
            Ok(summary) => summary,
            Err(e @ (PipelineError::Csv(_) | PipelineError::Transform(_))) => {
                log_error(format!("Transform of {} failed: {}", location, e));
                return Ok(issue());
            }
            Err(e) => return Err(e),
        };
        log_info_indent(format!("Encoding: {}", summary.encoding), 1);
        log_info_indent(format!("Columns: {}", summary.headers.join(", ")), 1);
        if summary.truncated {
            log_warning(format!(
                "Columns differ in length, output cut to {} rows",
                summary.output_rows
            ));
        }
        log_success(format!("Wrote {} rows to {}", summary.output_rows, output_name));

        let destination = report_key(output_name);
        log_info(format!("📤 Uploading {} to the {} bucket...", destination, location.bucket));
        match self.store.upload(&output_path, &location.bucket, &destination).await {
            Ok(()) => log_success("Uploaded"),
            Err(e) if e.is_not_found() => {
                log_warning(format!("The object does not exist: {}", e));
            }
            Err(e) => {
                log_error(format!("Upload to {} store failed: {}", self.store.name(), e));
                return Err(e.into());
            }
        }

        Ok(Outcome::success(output_name, &location.bucket))
    }
}
