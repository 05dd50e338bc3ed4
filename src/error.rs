//! Error types for the cherryload ETL pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ExtractError`] - dataset loading errors (missing or empty sources)
//! - [`TransformError`] - merge/finalization errors, including data-integrity violations
//! - [`StoreError`] - persistence errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP boundary errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Row-level outcomes (a rejected row, an unparseable ownership share) are
//! not errors: rows are dropped or degraded to an absent value and the run
//! continues. Only table-level and persistence-level failures abort.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Extraction Errors
// =============================================================================

/// Errors while loading a source dataset.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source file does not exist.
    #[error("No file at {}", .0.display())]
    NotFound(PathBuf),

    /// The source file exists but holds no data.
    #[error("No data in {}", .0.display())]
    Empty(PathBuf),

    /// A required column is missing from the header row. This is a contract
    /// violation of the source, not a per-row validation outcome.
    #[error("{}: missing required columns: {}", path.display(), missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Malformed CSV content.
    #[error("Invalid CSV: {0}")]
    ParseError(#[from] csv::Error),

    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during merge and row finalization.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A merged row survived the post-merge filters without a join key that
    /// upstream validation should have guaranteed. Surfaced instead of
    /// emitting a malformed composite id.
    #[error("Data integrity violation in merged row {row}: blank {field}")]
    DataIntegrity { row: usize, field: &'static str },
}

// =============================================================================
// Persistence Errors
// =============================================================================

/// Errors from the record store.
///
/// Collection replacement is delete-then-insert with no transaction, so a
/// failure partway can leave the collection empty or partially written.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected the operation. The collection may be left
    /// inconsistent if this happened between delete and insert.
    #[error("Store operation failed (collection may be inconsistent): {0}")]
    Backend(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::pipeline::run_pipeline`].
/// Any variant aborts the remaining stages; no partial success is modeled.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source dataset could not be loaded.
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Merge or finalization failed.
    #[error("Transformation failed: {0}")]
    Transform(#[from] TransformError),

    /// Replacing the collection contents failed.
    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP boundary errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error surfaced through an endpoint.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ExtractError -> PipelineError
        let extract_err = ExtractError::Empty(PathBuf::from("/dataset/assets.csv"));
        let pipeline_err: PipelineError = extract_err.into();
        assert!(pipeline_err.to_string().contains("No data"));

        // TransformError -> PipelineError
        let transform_err = TransformError::DataIntegrity { row: 3, field: "asset_id" };
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("asset_id"));

        // StoreError -> PipelineError
        let store_err = StoreError::Backend("insert rejected".into());
        let pipeline_err: PipelineError = store_err.into();
        assert!(pipeline_err.to_string().contains("insert rejected"));
    }

    #[test]
    fn test_store_error_warns_about_consistency() {
        let err = StoreError::Backend("connection reset".into());
        assert!(err.to_string().contains("may be inconsistent"));
    }

    #[test]
    fn test_schema_mismatch_lists_columns() {
        let err = ExtractError::SchemaMismatch {
            path: PathBuf::from("entities.csv"),
            missing: vec!["entity_id".into(), "vatCode".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("entities.csv"));
        assert!(msg.contains("entity_id"));
        assert!(msg.contains("vatCode"));
    }
}
