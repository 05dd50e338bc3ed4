//! Domain models for the cherryload ETL pipeline.
//!
//! One record type per pipeline stage:
//!
//! - [`AssetRecord`] - a physical property unit, keyed by cadastral fields
//! - [`EntityRecord`] - a legal or natural owner
//! - [`JoinRecord`] - one ownership stake bridging an entity to an asset
//! - [`ParsedJoin`] - a join record with its share parsed to a number
//! - [`MergedRow`] - the denormalized outer-join of the three tables
//! - [`Ownership`] - the nested ownership sub-document of an output record
//! - [`OutputRecord`] - the flat persisted document
//!
//! Absent values are `Option`s, never sentinel strings. A blank, `NaN` or
//! `nan` CSV cell normalizes to `None` at deserialization time, so the
//! cleaning primitives only ever reason about one notion of missingness.
//!
//! Field access for the column-generic cleaning primitives goes through
//! plain accessor methods (`fn(&T) -> Option<&str>`), which coerce to the
//! selector function pointers in [`crate::clean`].

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an optional text cell, folding `""`, `NaN` and `nan` into
/// absence. Values are trimmed.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "NaN" || trimmed == "nan" {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

// =============================================================================
// Source Records
// =============================================================================

/// One physical property unit from the assets dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub asset_id: Option<String>,
    #[serde(rename = "cityCode", default, deserialize_with = "blank_as_none")]
    pub city_code: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub catasto: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sezione: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub foglio: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub particella: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub subalterno: Option<String>,
}

impl AssetRecord {
    /// Expected header columns of the assets dataset.
    pub const COLUMNS: &'static [&'static str] = &[
        "asset_id",
        "cityCode",
        "catasto",
        "sezione",
        "foglio",
        "particella",
        "subalterno",
    ];

    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }

    pub fn particella(&self) -> Option<&str> {
        self.particella.as_deref()
    }

    pub fn subalterno(&self) -> Option<&str> {
        self.subalterno.as_deref()
    }
}

/// One legal or natural owner from the entities dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub entity_id: Option<String>,
    #[serde(rename = "vatCode", default, deserialize_with = "blank_as_none")]
    pub vat_code: Option<String>,
    #[serde(rename = "taxCode", default, deserialize_with = "blank_as_none")]
    pub tax_code: Option<String>,
}

impl EntityRecord {
    /// Expected header columns of the entities dataset.
    pub const COLUMNS: &'static [&'static str] = &["entity_id", "vatCode", "taxCode"];

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn vat_code(&self) -> Option<&str> {
        self.vat_code.as_deref()
    }

    pub fn tax_code(&self) -> Option<&str> {
        self.tax_code.as_deref()
    }
}

/// One ownership stake from the many-to-many join dataset.
///
/// `ownership_share` stays raw text here; it is parsed downstream by
/// [`crate::transform::parse_ownership_share`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRecord {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub asset_id: Option<String>,
    #[serde(rename = "ownershipShare", default, deserialize_with = "blank_as_none")]
    pub ownership_share: Option<String>,
}

impl JoinRecord {
    /// Expected header columns of the join dataset.
    pub const COLUMNS: &'static [&'static str] = &["entity_id", "asset_id", "ownershipShare"];

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }
}

/// A join record after share parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJoin {
    pub entity_id: Option<String>,
    pub asset_id: Option<String>,
    pub ownership_share: Option<f64>,
}

// =============================================================================
// Merged Row
// =============================================================================

/// One row of the outer join of joins, entities and assets.
///
/// Column order follows the merge: join columns, then entity columns, then
/// asset columns. An unmatched side leaves its columns absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedRow {
    pub entity_id: Option<String>,
    pub asset_id: Option<String>,
    pub ownership_share: Option<f64>,
    pub vat_code: Option<String>,
    pub tax_code: Option<String>,
    pub city_code: Option<String>,
    pub catasto: Option<String>,
    pub sezione: Option<String>,
    pub foglio: Option<String>,
    pub particella: Option<String>,
    pub subalterno: Option<String>,
}

impl MergedRow {
    pub fn vat_code(&self) -> Option<&str> {
        self.vat_code.as_deref()
    }

    pub fn tax_code(&self) -> Option<&str> {
        self.tax_code.as_deref()
    }

    pub fn entity_id_mut(&mut self) -> &mut Option<String> {
        &mut self.entity_id
    }

    pub fn asset_id_mut(&mut self) -> &mut Option<String> {
        &mut self.asset_id
    }

    pub fn vat_code_mut(&mut self) -> &mut Option<String> {
        &mut self.vat_code
    }

    pub fn tax_code_mut(&mut self) -> &mut Option<String> {
        &mut self.tax_code
    }

    pub fn city_code_mut(&mut self) -> &mut Option<String> {
        &mut self.city_code
    }

    pub fn catasto_mut(&mut self) -> &mut Option<String> {
        &mut self.catasto
    }

    pub fn sezione_mut(&mut self) -> &mut Option<String> {
        &mut self.sezione
    }

    pub fn foglio_mut(&mut self) -> &mut Option<String> {
        &mut self.foglio
    }

    pub fn particella_mut(&mut self) -> &mut Option<String> {
        &mut self.particella
    }

    pub fn subalterno_mut(&mut self) -> &mut Option<String> {
        &mut self.subalterno
    }
}

// =============================================================================
// Output Records
// =============================================================================

/// The ownership stake nested inside an output record.
///
/// Built directly as a typed value from the row's own columns; each merged
/// row yields exactly one of these, never an aggregation across rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ownership {
    pub entity_id: String,
    #[serde(rename = "vatCode")]
    pub vat_code: String,
    #[serde(rename = "taxCode")]
    pub tax_code: String,
    /// Fractional stake; `None` serializes as JSON null (unparseable share).
    #[serde(rename = "ownershipShare")]
    pub ownership_share: Option<f64>,
}

/// The flat persisted document: exactly the eight output columns, blanks as
/// empty strings, `ownerships` as a structured sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Synthesized composite business key:
    /// `asset_id-cityCode-catasto-foglio-particella`.
    pub cherry_asset_id: String,
    #[serde(rename = "cityCode")]
    pub city_code: String,
    pub catasto: String,
    pub sezione: String,
    pub foglio: String,
    pub particella: String,
    pub subalterno: String,
    pub ownerships: Ownership,
}
