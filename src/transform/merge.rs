//! Merge engine: full outer join of the three datasets.
//!
//! Joins merge with entities on `entity_id`, then the result merges with
//! assets on `asset_id`. Outer semantics throughout: a row with no match on
//! the key still appears, with the opposite side's columns absent. An absent
//! key never matches anything. Row multiplicity is relational: a key that
//! hits several rows on the other side fans out.
//!
//! Left order is preserved; unmatched right-side rows are appended after it.

use std::collections::HashMap;

use crate::models::{AssetRecord, EntityRecord, MergedRow, ParsedJoin};

/// Full outer join of `joins` with `entities`, then with `assets`.
pub fn merge_data(
    assets: &[AssetRecord],
    entities: &[EntityRecord],
    joins: &[ParsedJoin],
) -> Vec<MergedRow> {
    let joined_entities = join_entities(joins, entities);
    join_assets(joined_entities, assets)
}

fn join_entities(joins: &[ParsedJoin], entities: &[EntityRecord]) -> Vec<MergedRow> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, entity) in entities.iter().enumerate() {
        if let Some(key) = entity.entity_id() {
            index.entry(key).or_default().push(i);
        }
    }

    let mut matched = vec![false; entities.len()];
    let mut rows = Vec::new();

    for join in joins {
        match join.entity_id.as_deref().and_then(|key| index.get(key)) {
            Some(hits) => {
                for &i in hits {
                    matched[i] = true;
                    rows.push(join_entity_row(join, Some(&entities[i])));
                }
            }
            None => rows.push(join_entity_row(join, None)),
        }
    }

    for (i, entity) in entities.iter().enumerate() {
        if !matched[i] {
            rows.push(MergedRow {
                entity_id: entity.entity_id.clone(),
                vat_code: entity.vat_code.clone(),
                tax_code: entity.tax_code.clone(),
                ..MergedRow::default()
            });
        }
    }

    rows
}

fn join_entity_row(join: &ParsedJoin, entity: Option<&EntityRecord>) -> MergedRow {
    MergedRow {
        entity_id: join.entity_id.clone(),
        asset_id: join.asset_id.clone(),
        ownership_share: join.ownership_share,
        vat_code: entity.and_then(|e| e.vat_code.clone()),
        tax_code: entity.and_then(|e| e.tax_code.clone()),
        ..MergedRow::default()
    }
}

fn join_assets(rows: Vec<MergedRow>, assets: &[AssetRecord]) -> Vec<MergedRow> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, asset) in assets.iter().enumerate() {
        if let Some(key) = asset.asset_id() {
            index.entry(key).or_default().push(i);
        }
    }

    let mut matched = vec![false; assets.len()];
    let mut merged = Vec::with_capacity(rows.len());

    for row in rows {
        match row.asset_id.as_deref().and_then(|key| index.get(key)) {
            Some(hits) => {
                for &i in hits {
                    matched[i] = true;
                    merged.push(with_asset(row.clone(), &assets[i]));
                }
            }
            None => merged.push(row),
        }
    }

    for (i, asset) in assets.iter().enumerate() {
        if !matched[i] {
            merged.push(with_asset(
                MergedRow {
                    asset_id: asset.asset_id.clone(),
                    ..MergedRow::default()
                },
                asset,
            ));
        }
    }

    merged
}

fn with_asset(mut row: MergedRow, asset: &AssetRecord) -> MergedRow {
    row.city_code = asset.city_code.clone();
    row.catasto = asset.catasto.clone();
    row.sezione = asset.sezione.clone();
    row.foglio = asset.foglio.clone();
    row.particella = asset.particella.clone();
    row.subalterno = asset.subalterno.clone();
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, city: &str) -> AssetRecord {
        AssetRecord {
            asset_id: Some(id.into()),
            city_code: Some(city.into()),
            catasto: Some("A".into()),
            sezione: None,
            foglio: Some("3".into()),
            particella: Some("12".into()),
            subalterno: Some("5".into()),
        }
    }

    fn entity(id: &str, vat: Option<&str>, tax: Option<&str>) -> EntityRecord {
        EntityRecord {
            entity_id: Some(id.into()),
            vat_code: vat.map(String::from),
            tax_code: tax.map(String::from),
        }
    }

    fn join(entity_id: &str, asset_id: &str, share: Option<f64>) -> ParsedJoin {
        ParsedJoin {
            entity_id: Some(entity_id.into()),
            asset_id: Some(asset_id.into()),
            ownership_share: share,
        }
    }

    #[test]
    fn test_cardinality_one_match_each() {
        // N joins, each matching exactly one entity and one asset: exactly
        // N merged rows, no fan-out, no drops.
        let assets = vec![asset("1", "H211"), asset("2", "F205")];
        let entities = vec![entity("9", Some("V1"), Some("T1")), entity("8", Some("V2"), None)];
        let joins = vec![join("9", "1", Some(0.5)), join("8", "2", None)];

        let merged = merge_data(&assets, &entities, &joins);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].vat_code.as_deref(), Some("V1"));
        assert_eq!(merged[0].city_code.as_deref(), Some("H211"));
        assert_eq!(merged[0].ownership_share, Some(0.5));
        assert_eq!(merged[1].city_code.as_deref(), Some("F205"));
    }

    #[test]
    fn test_unmatched_entity_appended_with_blank_columns() {
        let assets = vec![asset("1", "H211")];
        let entities = vec![entity("9", Some("V1"), Some("T1")), entity("99", Some("V9"), None)];
        let joins = vec![join("9", "1", None)];

        let merged = merge_data(&assets, &entities, &joins);
        assert_eq!(merged.len(), 2);
        let orphan = &merged[1];
        assert_eq!(orphan.entity_id.as_deref(), Some("99"));
        assert_eq!(orphan.asset_id, None);
        assert_eq!(orphan.city_code, None);
    }

    #[test]
    fn test_unmatched_asset_appended_with_blank_columns() {
        let assets = vec![asset("1", "H211"), asset("7", "Z999")];
        let entities = vec![entity("9", Some("V1"), Some("T1"))];
        let joins = vec![join("9", "1", None)];

        let merged = merge_data(&assets, &entities, &joins);
        assert_eq!(merged.len(), 2);
        let orphan = &merged[1];
        assert_eq!(orphan.asset_id.as_deref(), Some("7"));
        assert_eq!(orphan.city_code.as_deref(), Some("Z999"));
        assert_eq!(orphan.entity_id, None);
        assert_eq!(orphan.vat_code, None);
    }

    #[test]
    fn test_join_with_unknown_entity_keeps_join_side() {
        let assets = vec![asset("1", "H211")];
        let entities: Vec<EntityRecord> = Vec::new();
        let joins = vec![join("9", "1", Some(1.0))];

        let merged = merge_data(&assets, &entities, &joins);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].entity_id.as_deref(), Some("9"));
        assert_eq!(merged[0].vat_code, None);
        assert_eq!(merged[0].city_code.as_deref(), Some("H211"));
    }

    #[test]
    fn test_duplicate_entity_key_fans_out() {
        let assets = vec![asset("1", "H211")];
        let entities = vec![entity("9", Some("V1"), None), entity("9", Some("V2"), None)];
        let joins = vec![join("9", "1", None)];

        let merged = merge_data(&assets, &entities, &joins);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].vat_code.as_deref(), Some("V1"));
        assert_eq!(merged[1].vat_code.as_deref(), Some("V2"));
    }

    #[test]
    fn test_absent_key_never_matches() {
        // An entity with no id and a join with no entity id must not pair up.
        let assets = vec![asset("1", "H211")];
        let entities = vec![EntityRecord { entity_id: None, vat_code: Some("V1".into()), tax_code: None }];
        let joins = vec![ParsedJoin { entity_id: None, asset_id: Some("1".into()), ownership_share: None }];

        let merged = merge_data(&assets, &entities, &joins);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].vat_code, None);
        assert_eq!(merged[1].vat_code.as_deref(), Some("V1"));
    }
}
