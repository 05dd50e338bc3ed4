//! REST API response types.
//!
//! Responses carry the flat records as JSON documents plus a run summary,
//! so a caller can see what the pipeline did without tailing the log
//! stream.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::pipeline::PipelineReport;

/// Response for the data endpoints: the persisted records and a summary of
/// the run that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    /// "ready" when every record passed the output schema, "warning"
    /// otherwise.
    pub status: String,

    /// Flat cherry-asset records.
    pub data: Vec<Value>,

    /// Summary of the pipeline run.
    pub metadata: RunMetadata,
}

/// Summary of a pipeline run, for the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub run_id: String,
    pub collection: String,
    pub rows_extracted: DatasetCounts,
    pub rows_valid: DatasetCounts,
    pub records_persisted: usize,
    pub schema_valid: usize,
    pub schema_invalid: usize,
}

/// Per-dataset row counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCounts {
    pub assets: usize,
    pub entities: usize,
    pub joins: usize,
}

impl DataResponse {
    pub fn new(report: &PipelineReport, data: Vec<Value>) -> Self {
        let status = if report.schema_invalid == 0 { "ready" } else { "warning" };
        Self {
            status: status.to_string(),
            data,
            metadata: RunMetadata::from(report),
        }
    }
}

impl From<&PipelineReport> for RunMetadata {
    fn from(report: &PipelineReport) -> Self {
        Self {
            run_id: report.run_id.clone(),
            collection: report.collection.clone(),
            rows_extracted: DatasetCounts {
                assets: report.assets_extracted,
                entities: report.entities_extracted,
                joins: report.joins_extracted,
            },
            rows_valid: DatasetCounts {
                assets: report.assets_valid,
                entities: report.entities_valid,
                joins: report.joins_valid,
            },
            records_persisted: report.records_persisted,
            schema_valid: report.schema_valid,
            schema_invalid: report.schema_invalid,
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "data": [],
    })
}
