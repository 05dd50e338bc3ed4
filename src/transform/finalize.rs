//! Row finalization: from validated tables to flat output records.
//!
//! `transform_data` is the core of the pipeline. It parses ownership
//! shares, runs the outer merge, applies the post-merge filters, and derives
//! the composite `cherry_asset_id` plus the nested ownership sub-document
//! for every surviving row.

use crate::clean::{self, FieldMut};
use crate::error::{TransformError, TransformResult};
use crate::models::{
    AssetRecord, EntityRecord, JoinRecord, MergedRow, OutputRecord, Ownership,
};
use crate::transform::merge::merge_data;
use crate::transform::share::parse_join;

/// The text columns of a merged row, in column order. Blank-filling runs
/// over all of them so every survivor serializes with empty strings, never
/// holes.
const TEXT_FIELDS: [FieldMut<MergedRow>; 10] = [
    MergedRow::entity_id_mut,
    MergedRow::asset_id_mut,
    MergedRow::vat_code_mut,
    MergedRow::tax_code_mut,
    MergedRow::city_code_mut,
    MergedRow::catasto_mut,
    MergedRow::sezione_mut,
    MergedRow::foglio_mut,
    MergedRow::particella_mut,
    MergedRow::subalterno_mut,
];

/// Transform the three validated datasets into output records.
///
/// Sequence:
/// 1. parse each join's `ownershipShare` (unparseable shares degrade to
///    absence, never abort),
/// 2. full outer merge,
/// 3. drop rows where both `vatCode` and `taxCode` are blank (this also
///    catches rows the merge itself left without entity data),
/// 4. collapse exact duplicates,
/// 5. blank-fill the remaining absences,
/// 6. derive `cherry_asset_id` and the nested ownership per row.
///
/// A surviving row with a blank `asset_id` or `entity_id` means an upstream
/// collaborator broke its contract; it surfaces as
/// [`TransformError::DataIntegrity`] instead of producing a malformed
/// composite id.
pub fn transform_data(
    assets: Vec<AssetRecord>,
    entities: Vec<EntityRecord>,
    joins: Vec<JoinRecord>,
) -> TransformResult<Vec<OutputRecord>> {
    let parsed: Vec<_> = joins.into_iter().map(parse_join).collect();

    let mut rows = merge_data(&assets, &entities, &parsed);
    rows = clean::drop_all_blank_among(rows, &[MergedRow::vat_code, MergedRow::tax_code]);
    rows = clean::drop_duplicate_rows(rows);
    clean::blank_fill(&mut rows, &TEXT_FIELDS);

    rows.iter()
        .enumerate()
        .map(|(i, row)| finalize_row(i, row))
        .collect()
}

fn finalize_row(index: usize, row: &MergedRow) -> TransformResult<OutputRecord> {
    if clean::is_blank(row.asset_id.as_deref()) {
        return Err(TransformError::DataIntegrity { row: index, field: "asset_id" });
    }
    if clean::is_blank(row.entity_id.as_deref()) {
        return Err(TransformError::DataIntegrity { row: index, field: "entity_id" });
    }

    Ok(OutputRecord {
        cherry_asset_id: cherry_asset_id(row),
        city_code: text(&row.city_code),
        catasto: text(&row.catasto),
        sezione: text(&row.sezione),
        foglio: text(&row.foglio),
        particella: text(&row.particella),
        subalterno: text(&row.subalterno),
        ownerships: Ownership {
            entity_id: text(&row.entity_id),
            vat_code: text(&row.vat_code),
            tax_code: text(&row.tax_code),
            ownership_share: row.ownership_share,
        },
    })
}

/// Compose the stable business key of an output record by hyphen-joining
/// `asset_id, cityCode, catasto, foglio, particella` in that order.
///
/// No escaping: a component containing `-` makes the id irreversible. Known
/// limitation of the id scheme, kept as-is.
pub fn cherry_asset_id(row: &MergedRow) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        text(&row.asset_id),
        text(&row.city_code),
        text(&row.catasto),
        text(&row.foglio),
        text(&row.particella),
    )
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> AssetRecord {
        AssetRecord {
            asset_id: Some("1".into()),
            city_code: Some("H211".into()),
            catasto: Some("A".into()),
            sezione: None,
            foglio: Some("3".into()),
            particella: Some("12".into()),
            subalterno: Some("5".into()),
        }
    }

    fn entity() -> EntityRecord {
        EntityRecord {
            entity_id: Some("9".into()),
            vat_code: Some("V1".into()),
            tax_code: Some("T1".into()),
        }
    }

    fn join(share: Option<&str>) -> JoinRecord {
        JoinRecord {
            entity_id: Some("9".into()),
            asset_id: Some("1".into()),
            ownership_share: share.map(String::from),
        }
    }

    #[test]
    fn test_end_to_end_single_stake() {
        let records =
            transform_data(vec![asset()], vec![entity()], vec![join(Some("1/2"))]).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.cherry_asset_id, "1-H211-A-3-12");
        assert_eq!(record.city_code, "H211");
        assert_eq!(record.sezione, "");
        assert_eq!(record.subalterno, "5");
        assert_eq!(record.ownerships.entity_id, "9");
        assert_eq!(record.ownerships.vat_code, "V1");
        assert_eq!(record.ownerships.tax_code, "T1");
        assert_eq!(record.ownerships.ownership_share, Some(0.5));
    }

    #[test]
    fn test_cherry_asset_id_deterministic() {
        let row = MergedRow {
            asset_id: Some("1".into()),
            city_code: Some("H211".into()),
            catasto: Some("A".into()),
            foglio: Some("3".into()),
            particella: Some("12".into()),
            ..MergedRow::default()
        };
        assert_eq!(cherry_asset_id(&row), cherry_asset_id(&row.clone()));
        assert_eq!(cherry_asset_id(&row), "1-H211-A-3-12");
    }

    #[test]
    fn test_unparseable_share_degrades_to_null() {
        let records =
            transform_data(vec![asset()], vec![entity()], vec![join(Some("abc"))]).unwrap();
        assert_eq!(records[0].ownerships.ownership_share, None);
    }

    #[test]
    fn test_rows_without_any_tax_identity_are_dropped() {
        // An asset no join references merges with blank entity columns and
        // must not reach the output.
        let mut other = asset();
        other.asset_id = Some("2".into());
        let records =
            transform_data(vec![asset(), other], vec![entity()], vec![join(None)]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cherry_asset_id, "1-H211-A-3-12");
    }

    #[test]
    fn test_duplicate_stakes_collapse() {
        let records = transform_data(
            vec![asset()],
            vec![entity()],
            vec![join(Some("1/2")), join(Some("1/2"))],
        )
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_distinct_stakes_both_survive() {
        let records = transform_data(
            vec![asset()],
            vec![entity()],
            vec![join(Some("1/2")), join(Some("1/4"))],
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cherry_asset_id, records[1].cherry_asset_id);
        assert_eq!(records[1].ownerships.ownership_share, Some(0.25));
    }

    #[test]
    fn test_orphan_entity_is_a_data_integrity_error() {
        // An entity with tax identity but no join record survives the
        // vat/tax filter with a blank asset_id. That is a broken upstream
        // contract, not a row to silently emit.
        let orphan = EntityRecord {
            entity_id: Some("77".into()),
            vat_code: Some("V9".into()),
            tax_code: None,
        };
        let result = transform_data(vec![asset()], vec![entity(), orphan], vec![join(None)]);
        let err = result.unwrap_err();
        assert!(matches!(err, TransformError::DataIntegrity { field: "asset_id", .. }));
    }

    #[test]
    fn test_join_with_unknown_asset_keeps_its_key() {
        // The join carries its own asset_id even when no asset row matches;
        // asset columns blank-fill into the composite id.
        let stray = JoinRecord {
            entity_id: Some("9".into()),
            asset_id: Some("404".into()),
            ownership_share: None,
        };
        let records = transform_data(vec![], vec![entity()], vec![stray]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cherry_asset_id, "404----");
    }
}
