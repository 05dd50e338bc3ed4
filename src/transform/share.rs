//! Ownership-share parsing.
//!
//! Shares arrive as free text: plain decimals (`"0.5"`, `"2"`) or fraction
//! strings (`"1/4"`). Parsing is total: every input maps to a value or to
//! absence, never to an error. An unparseable share degrades the one cell,
//! not the row and not the run.

use crate::models::{JoinRecord, ParsedJoin};

/// Parse a textual ownership share into a fractional number.
///
/// - Absent input stays absent.
/// - `numerator/denominator` divides and rounds to 2 decimal places, ties
///   to even; an unparseable part or a zero denominator yields absence.
///   Only the first `/` splits, so anything with a second one fails the
///   denominator parse.
/// - Anything else parses directly as a decimal, unrounded.
pub fn parse_ownership_share(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    match raw.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            Some(round2(numerator / denominator))
        }
        None => raw.trim().parse().ok(),
    }
}

/// Lift a raw join record into its parsed form, replacing the textual share
/// with its numeric value.
pub fn parse_join(record: JoinRecord) -> ParsedJoin {
    let ownership_share = parse_ownership_share(record.ownership_share.as_deref());
    ParsedJoin {
        entity_id: record.entity_id,
        asset_id: record.asset_id,
        ownership_share,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
