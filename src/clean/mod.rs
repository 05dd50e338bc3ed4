//! Column-generic cleaning primitives.
//!
//! Every primitive is parameterized over field selectors instead of
//! string-keyed column names: a selector is a plain function pointer from a
//! row to one of its optional text fields, so "any subset of named columns"
//! is expressed as a slice of accessors and checked at compile time.
//!
//! All primitives are pure over their input (row removal aside, order is
//! preserved) and never fail: a row either survives or it does not.

use once_cell::sync::Lazy;
use regex::Regex;

/// Read selector: borrows one optional text column from a row.
pub type Field<T> = fn(&T) -> Option<&str>;

/// Write selector: exposes one optional text column of a row for in-place
/// fills.
pub type FieldMut<T> = fn(&mut T) -> &mut Option<String>;

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("invalid alphanumeric pattern"));

/// A value counts as blank when it is absent, empty, or the literal text
/// `NaN`/`nan` that a sloppy upstream export uses for missing cells.
pub fn is_blank(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_empty() || v == "NaN" || v == "nan",
    }
}

/// Remove any row where at least one of the required fields is blank.
pub fn drop_missing_required<T>(rows: Vec<T>, required: &[Field<T>]) -> Vec<T> {
    rows.into_iter()
        .filter(|row| required.iter().all(|field| !is_blank(field(row))))
        .collect()
}

/// Remove any row where a listed column is present but fails
/// `^[A-Za-z0-9]+$`. Absent columns pass: the format invariant only binds
/// once a value exists. Filters compose across columns, so a row survives
/// only if every listed column passes.
pub fn drop_non_alphanumeric<T>(rows: Vec<T>, columns: &[Field<T>]) -> Vec<T> {
    rows.into_iter()
        .filter(|row| {
            columns.iter().all(|field| match field(row) {
                Some(value) => ALPHANUMERIC.is_match(value),
                None => true,
            })
        })
        .collect()
}

/// Remove a row only when *all* listed columns are blank at once. Weaker
/// than [`drop_missing_required`]: one surviving value keeps the row.
pub fn drop_all_blank_among<T>(rows: Vec<T>, columns: &[Field<T>]) -> Vec<T> {
    rows.into_iter()
        .filter(|row| !columns.iter().all(|field| is_blank(field(row))))
        .collect()
}

/// Remove rows that are exact duplicates of an earlier row, keeping the
/// first occurrence and the remaining order.
///
/// Quadratic scan over `PartialEq` rather than a hash set: merged rows carry
/// an `Option<f64>` share, and the datasets are single batch files.
pub fn drop_duplicate_rows<T: PartialEq>(rows: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        if !unique.contains(&row) {
            unique.push(row);
        }
    }
    unique
}

/// Replace every blank value in the listed columns (absent, or the literal
/// `NaN`/`nan`) with the empty-string sentinel.
pub fn blank_fill<T>(rows: &mut [T], fields: &[FieldMut<T>]) {
    for row in rows.iter_mut() {
        for field in fields {
            let slot = field(row);
            if is_blank(slot.as_deref()) {
                *slot = Some(String::new());
            }
        }
    }
}

/// Reset the listed columns to absent. The typed rendition of dropping
/// columns from a table: the selectors are compile-checked, so there is no
/// "unknown column" case to ignore.
pub fn clear_fields<T>(rows: &mut [T], fields: &[FieldMut<T>]) {
    for row in rows.iter_mut() {
        for field in fields {
            *field(row) = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Row {
        a: Option<String>,
        b: Option<String>,
    }

    impl Row {
        fn new(a: Option<&str>, b: Option<&str>) -> Self {
            Self {
                a: a.map(String::from),
                b: b.map(String::from),
            }
        }

        fn a(&self) -> Option<&str> {
            self.a.as_deref()
        }

        fn b(&self) -> Option<&str> {
            self.b.as_deref()
        }

        fn a_mut(&mut self) -> &mut Option<String> {
            &mut self.a
        }

        fn b_mut(&mut self) -> &mut Option<String> {
            &mut self.b
        }
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("NaN")));
        assert!(is_blank(Some("nan")));
        assert!(!is_blank(Some("0")));
    }

    #[test]
    fn test_drop_missing_required() {
        let rows = vec![
            Row::new(Some("1"), Some("x")),
            Row::new(None, Some("y")),
            Row::new(Some("3"), None),
        ];
        let kept = drop_missing_required(rows, &[Row::a]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].a.as_deref(), Some("1"));
        assert_eq!(kept[1].a.as_deref(), Some("3"));
    }

    #[test]
    fn test_drop_non_alphanumeric_keeps_iff_pattern_matches() {
        let rows = vec![
            Row::new(Some("123abc"), None),
            Row::new(Some("12-3"), None),
            Row::new(Some("789!@#"), None),
        ];
        let kept = drop_non_alphanumeric(rows, &[Row::a]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].a.as_deref(), Some("123abc"));
    }

    #[test]
    fn test_drop_non_alphanumeric_absent_passes() {
        let rows = vec![Row::new(None, Some("ok"))];
        let kept = drop_non_alphanumeric(rows, &[Row::a]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_drop_non_alphanumeric_filters_compose() {
        // Survives column a but is dropped by column b.
        let rows = vec![Row::new(Some("abc"), Some("d.e"))];
        let kept = drop_non_alphanumeric(rows, &[Row::a, Row::b]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_drop_all_blank_among() {
        let rows = vec![
            Row::new(Some("v"), None),
            Row::new(None, Some("t")),
            Row::new(None, None),
            Row::new(Some("NaN"), Some("nan")),
        ];
        let kept = drop_all_blank_among(rows, &[Row::a, Row::b]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_drop_duplicate_rows_keeps_first_and_order() {
        let rows = vec![
            Row::new(Some("1"), Some("x")),
            Row::new(Some("2"), Some("y")),
            Row::new(Some("1"), Some("x")),
            Row::new(Some("3"), Some("z")),
        ];
        let kept = drop_duplicate_rows(rows);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[1].a.as_deref(), Some("2"));
        assert_eq!(kept[2].a.as_deref(), Some("3"));
    }

    #[test]
    fn test_drop_duplicate_rows_idempotent() {
        let rows = vec![
            Row::new(Some("1"), None),
            Row::new(Some("1"), None),
            Row::new(Some("2"), None),
        ];
        let once = drop_duplicate_rows(rows);
        let twice = drop_duplicate_rows(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_fill() {
        let mut rows = vec![Row::new(None, Some("NaN")), Row::new(Some("keep"), Some("nan"))];
        blank_fill(&mut rows, &[Row::a_mut, Row::b_mut]);
        assert_eq!(rows[0].a.as_deref(), Some(""));
        assert_eq!(rows[0].b.as_deref(), Some(""));
        assert_eq!(rows[1].a.as_deref(), Some("keep"));
        assert_eq!(rows[1].b.as_deref(), Some(""));
    }

    #[test]
    fn test_clear_fields() {
        let mut rows = vec![Row::new(Some("1"), Some("2"))];
        clear_fields(&mut rows, &[Row::b_mut]);
        assert_eq!(rows[0].a.as_deref(), Some("1"));
        assert_eq!(rows[0].b, None);
    }
}
