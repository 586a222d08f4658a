//! REST API types.
//!
//! Outcomes are returned in the shape of the invocation result contract:
//! status label, report file name, bucket.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::Outcome;

/// Response sent after processing a storage notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeResponse {
    /// "Success" or "There was an issue"
    pub status: String,

    /// Report file name
    pub file_name: String,

    /// Bucket the report was (or would have been) uploaded to
    pub bucket: String,

    /// Error detail when the invocation failed outright
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Outcome> for OutcomeResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            status: outcome.status.label().to_string(),
            file_name: outcome.file_name,
            bucket: outcome.bucket,
            error: None,
        }
    }
}

impl OutcomeResponse {
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "There was an issue",
        "error": error,
    })
}
