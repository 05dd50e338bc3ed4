//! # Cherryload - cadastral asset ETL
//!
//! Cherryload ingests three CSV exports (assets, entities, and the
//! entity/asset ownership join), validates and merges them, and persists
//! flat cherry-asset records for consumption over a small HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV Files  │────▶│  Extract    │────▶│  Validate   │────▶│  Transform  │
//! │ (3 sources) │     │ (auto-enc)  │     │ (row rules) │     │(merge+final)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                         ┌─────────────┐     ┌──────▼──────┐
//!                                         │  HTTP API   │◀────│    Store    │
//!                                         │ (axum, SSE) │     │ (replace)   │
//!                                         └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cherryload::{run_pipeline, Config, InMemoryStore};
//!
//! fn main() {
//!     let config = Config::from_env();
//!     let store = InMemoryStore::new();
//!     let report = run_pipeline(&config, &store).unwrap();
//!     println!("Persisted {} records", report.records_persisted);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Typed dataset rows and the flat output record
//! - [`extract`] - CSV loading with encoding and delimiter auto-detection
//! - [`clean`] - Row-level cleaning primitives over field selectors
//! - [`validate`] - Per-dataset validation and output schema checking
//! - [`transform`] - Share parsing, two-stage merge, and finalization
//! - [`store`] - Record store trait and in-memory backend
//! - [`pipeline`] - End-to-end orchestration
//! - [`api`] - HTTP server, response types, SSE log streaming

pub mod api;
pub mod clean;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod transform;
pub mod validate;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExtractError, PipelineError, ServerError, StoreError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AssetRecord, EntityRecord, JoinRecord, MergedRow, OutputRecord, Ownership, ParsedJoin,
};

// =============================================================================
// Re-exports - Extraction
// =============================================================================

pub use extract::{
    decode_content, detect_delimiter, detect_encoding, extract_assets, extract_entities,
    extract_join, extract_records, Extraction,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validate::{
    is_valid, is_valid_output_record, validate, validate_assets, validate_entities,
    validate_join, validate_output_record,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{cherry_asset_id, merge_data, parse_join, parse_ownership_share, transform_data};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{records_to_documents, InMemoryStore, RecordStore};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{run_pipeline, PipelineReport};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::Config;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, DataResponse, DatasetCounts, RunMetadata};

// Server
pub mod server {
    pub use crate::api::server::{start_server, AppState};
}
