//! Per-dataset validators and output-record schema validation.
//!
//! The dataset validators compose the cleaning primitives into the fixed
//! acceptance rules of each source. They are pure, order-preserving except
//! for row removal, and never fail on well-formed input: a rejected row is
//! dropped, not reported. A missing column never reaches this layer; the
//! extractor treats that as a schema error at load time.
//!
//! Output records are additionally checked against a JSON Schema (draft 7)
//! embedded at compile time from `schemas/cherry-asset-flat.json`, as a
//! last guard before persistence.

use serde_json::Value;

use crate::clean::{
    drop_all_blank_among, drop_duplicate_rows, drop_missing_required, drop_non_alphanumeric,
};
use crate::models::{AssetRecord, EntityRecord, JoinRecord};

// =============================================================================
// Dataset Validators
// =============================================================================

/// Validate asset records: `particella` and `subalterno`, once present,
/// must be strictly alphanumeric; exact duplicates collapse to one.
pub fn validate_assets(assets: Vec<AssetRecord>) -> Vec<AssetRecord> {
    let assets = drop_non_alphanumeric(assets, &[AssetRecord::particella, AssetRecord::subalterno]);
    drop_duplicate_rows(assets)
}

/// Validate entity records: `entity_id` is mandatory; a record with neither
/// `vatCode` nor `taxCode` carries no usable tax identity and is dropped
/// (one of the two is enough); exact duplicates collapse to one.
pub fn validate_entities(entities: Vec<EntityRecord>) -> Vec<EntityRecord> {
    let entities = drop_missing_required(entities, &[EntityRecord::entity_id]);
    let entities = drop_all_blank_among(entities, &[EntityRecord::vat_code, EntityRecord::tax_code]);
    drop_duplicate_rows(entities)
}

/// Validate join records: both foreign keys are mandatory; exact duplicates
/// collapse to one. The share column is free text here and is parsed
/// downstream.
pub fn validate_join(joins: Vec<JoinRecord>) -> Vec<JoinRecord> {
    let joins = drop_missing_required(joins, &[JoinRecord::entity_id, JoinRecord::asset_id]);
    drop_duplicate_rows(joins)
}

// =============================================================================
// Output Schema Validation
// =============================================================================

/// Validate a JSON object against a JSON Schema.
///
/// Returns `Ok(())` when valid, or every violation message when not.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check against a JSON Schema.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a serialized flat record against the embedded output schema.
pub fn validate_output_record(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/cherry-asset-flat.json"))
        .expect("Invalid embedded schema");
    validate(&schema, data)
}

/// Quick check against the embedded output schema.
pub fn is_valid_output_record(data: &Value) -> bool {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/cherry-asset-flat.json"))
        .expect("Invalid embedded schema");
    is_valid(&schema, data)
}
