//! Pipeline orchestration: extract, validate, transform, persist.
//!
//! One invocation processes the full datasets in memory, in one pass, and
//! fully replaces the target collection. Any stage failure aborts the
//! remaining stages and surfaces as a single [`crate::error::PipelineError`];
//! nothing is persisted before the transform has fully succeeded, so a
//! failed run leaves the previous collection contents untouched up to the
//! point where replacement begins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::config::Config;
use crate::error::PipelineResult;
use crate::extract::{extract_assets, extract_entities, extract_join};
use crate::store::{records_to_documents, RecordStore};
use crate::transform::transform_data;
use crate::validate::{validate_assets, validate_entities, validate_join, validate_output_record};

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub run_id: String,
    pub collection: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rows read per dataset, before validation.
    pub assets_extracted: usize,
    pub entities_extracted: usize,
    pub joins_extracted: usize,
    /// Rows surviving validation per dataset.
    pub assets_valid: usize,
    pub entities_valid: usize,
    pub joins_valid: usize,
    /// Flat records written to the collection.
    pub records_persisted: usize,
    /// Output records passing/failing the embedded JSON schema. Failures
    /// are logged, not fatal.
    pub schema_valid: usize,
    pub schema_invalid: usize,
}

/// Run the full ETL flow against the configured dataset files, replacing
/// the contents of the configured collection in `store`.
pub fn run_pipeline(config: &Config, store: &dyn RecordStore) -> PipelineResult<PipelineReport> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    log_info(format!("Pipeline run {} started", run_id));

    // Extract
    let assets = extract_assets(&config.assets_path())?;
    log_success(format!(
        "Read {} asset rows ({}, delimiter '{}')",
        assets.records.len(),
        assets.encoding,
        printable_delimiter(assets.delimiter),
    ));
    let entities = extract_entities(&config.entities_path())?;
    log_success(format!(
        "Read {} entity rows ({}, delimiter '{}')",
        entities.records.len(),
        entities.encoding,
        printable_delimiter(entities.delimiter),
    ));
    let joins = extract_join(&config.join_path())?;
    log_success(format!(
        "Read {} join rows ({}, delimiter '{}')",
        joins.records.len(),
        joins.encoding,
        printable_delimiter(joins.delimiter),
    ));

    let assets_extracted = assets.records.len();
    let entities_extracted = entities.records.len();
    let joins_extracted = joins.records.len();

    // Validate
    let valid_assets = validate_assets(assets.records);
    let valid_entities = validate_entities(entities.records);
    let valid_joins = validate_join(joins.records);
    report_rejections("asset", assets_extracted, valid_assets.len());
    report_rejections("entity", entities_extracted, valid_entities.len());
    report_rejections("join", joins_extracted, valid_joins.len());

    let assets_valid = valid_assets.len();
    let entities_valid = valid_entities.len();
    let joins_valid = valid_joins.len();

    // Transform
    let records = transform_data(valid_assets, valid_entities, valid_joins)?;
    log_success(format!("Transformed into {} output records", records.len()));

    // Schema check before persistence; failures are reported, not fatal.
    let mut schema_valid = 0;
    let mut schema_invalid = 0;
    for (i, document) in records_to_documents(&records).iter().enumerate() {
        match validate_output_record(document) {
            Ok(()) => schema_valid += 1,
            Err(errors) => {
                schema_invalid += 1;
                if schema_invalid <= 3 {
                    log_warning(format!("Record {} fails schema: {}", i, errors.join(", ")));
                }
            }
        }
    }
    if schema_invalid > 0 {
        log_warning(format!("{} records fail the output schema", schema_invalid));
    } else {
        log_success(format!("All {} records match the output schema", schema_valid));
    }

    // Persist: delete-then-insert replacement of the whole collection.
    let records_persisted = store.replace_all(&config.collection, records)?;
    log_success(format!(
        "Replaced collection '{}' with {} records",
        config.collection, records_persisted,
    ));

    let finished_at = Utc::now();
    log_success(format!("Pipeline run {} finished", run_id));

    Ok(PipelineReport {
        run_id,
        collection: config.collection.clone(),
        started_at,
        finished_at,
        assets_extracted,
        entities_extracted,
        joins_extracted,
        assets_valid,
        entities_valid,
        joins_valid,
        records_persisted,
        schema_valid,
        schema_invalid,
    })
}

fn report_rejections(dataset: &str, before: usize, after: usize) {
    let dropped = before - after;
    if dropped > 0 {
        log_warning(format!("Dropped {} invalid {} rows, {} kept", dropped, dataset, after));
    } else {
        log_success(format!("All {} {} rows valid", after, dataset));
    }
}

fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
