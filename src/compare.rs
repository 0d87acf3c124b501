use log::{debug, warn};
use serde::Serialize;

use crate::columns::ColumnFilter;
use crate::diff::{reconstruct, SheetDiffResult};
use crate::differ::{DiffAlgorithm, LineDiffer, SimilarDiffer};
use crate::encode::encode;
use crate::error::{CompareError, Side};
use crate::source::TabularSource;

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub only_changes: bool,
    pub algorithm: DiffAlgorithm,
}

/// A sheet that was selected but could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSheet {
    pub sheet: String,
    pub reason: String,
}

/// Results of a multi-sheet run, in selection order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison {
    pub results: Vec<SheetDiffResult>,
    pub skipped: Vec<SkippedSheet>,
}

fn ensure_sheet(
    source: &dyn TabularSource,
    sheet: &str,
    side: Side,
) -> Result<(), CompareError> {
    if source.has_sheet(sheet) {
        Ok(())
    } else {
        Err(CompareError::SheetNotFound {
            sheet: sheet.to_string(),
            side,
        })
    }
}

/// Compares one sheet with an explicit line differ.
pub fn compare_sheet_with(
    before: &mut dyn TabularSource,
    after: &mut dyn TabularSource,
    sheet: &str,
    ignore: &[String],
    only_changes: bool,
    differ: &dyn LineDiffer,
) -> Result<SheetDiffResult, CompareError> {
    ensure_sheet(before, sheet, Side::Before)?;
    ensure_sheet(after, sheet, Side::After)?;

    let before_rows = before.rows(sheet)?;
    let after_rows = after.rows(sheet)?;
    let header = match before_rows.first() {
        Some(header) => header.clone(),
        None => return Err(CompareError::EmptySheet(sheet.to_string())),
    };

    let before_lines = encode(&before_rows)?;
    let after_lines = encode(&after_rows)?;
    let ops = differ.diff(&before_lines, &after_lines);
    debug!(
        "sheet '{sheet}': {} before rows, {} after rows, {} diff ops",
        before_rows.len(),
        after_rows.len(),
        ops.len()
    );

    let filter = ColumnFilter::from_raw(ignore, &header);
    let changes = reconstruct(
        &ops,
        &before_rows,
        &after_rows,
        &header,
        &filter,
        only_changes,
    )?;

    Ok(SheetDiffResult {
        sheet_name: sheet.to_string(),
        diffs: changes.diffs,
        added_rows: changes.added_rows,
        removed_rows: changes.removed_rows,
    })
}

pub fn compare_sheet(
    before: &mut dyn TabularSource,
    after: &mut dyn TabularSource,
    sheet: &str,
    ignore: &[String],
    opts: &CompareOptions,
) -> Result<SheetDiffResult, CompareError> {
    let differ = SimilarDiffer::new(opts.algorithm);
    compare_sheet_with(before, after, sheet, ignore, opts.only_changes, &differ)
}

/// Compares every named sheet; sheets missing on one side are skipped, not fatal.
pub fn compare_sheets(
    before: &mut dyn TabularSource,
    after: &mut dyn TabularSource,
    sheets: &[String],
    ignore: &[String],
    opts: &CompareOptions,
) -> Result<Comparison, CompareError> {
    let mut comparison = Comparison::default();

    for sheet in sheets {
        match compare_sheet(before, after, sheet, ignore, opts) {
            Ok(result) => comparison.results.push(result),
            Err(err) if err.is_sheet_not_found() => {
                warn!("skipping sheet: {err}");
                comparison.skipped.push(SkippedSheet {
                    sheet: sheet.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeKind, RowRef};
    use crate::differ::{DiffOp, OpTag};
    use crate::source::MemorySource;
    use crate::summary::summarize;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn people() -> Vec<Vec<String>> {
        grid(&[&["id", "name"], &["1", "Alice"], &["2", "Bob"]])
    }

    fn opts() -> CompareOptions {
        CompareOptions {
            only_changes: true,
            ..Default::default()
        }
    }

    #[test]
    fn comparing_a_sheet_with_itself_is_empty() {
        let mut before = MemorySource::new().with_sheet("S", people());
        let mut after = MemorySource::new().with_sheet("S", people());
        let result = compare_sheet(&mut before, &mut after, "S", &[], &opts()).unwrap();
        assert!(result.diffs.is_empty());
        assert!(result.is_identical());
        assert_eq!(result.sheet_name, "S");
    }

    #[test]
    fn modified_cell_end_to_end() {
        let mut before = MemorySource::new().with_sheet("S", people());
        let mut after = MemorySource::new()
            .with_sheet("S", grid(&[&["id", "name"], &["1", "Alice"], &["2", "Bobby"]]));
        let result = compare_sheet(&mut before, &mut after, "S", &[], &opts()).unwrap();
        assert_eq!(result.diffs.len(), 1);
        let d = &result.diffs[0];
        assert_eq!((d.row, d.col, d.kind), (RowRef::Data(1), 1, ChangeKind::Modified));
        assert_eq!((d.before.as_str(), d.after.as_str()), ("Bob", "Bobby"));
        assert_eq!(d.col_name, "name");
    }

    #[test]
    fn ignore_by_name_suppresses_change() {
        let mut before = MemorySource::new().with_sheet("S", people());
        let mut after = MemorySource::new()
            .with_sheet("S", grid(&[&["id", "name"], &["1", "Alice"], &["2", "Bobby"]]));
        let ignore = vec!["name".to_string()];
        let result = compare_sheet(&mut before, &mut after, "S", &ignore, &opts()).unwrap();
        assert!(result.diffs.is_empty());
        assert_eq!((result.added_rows, result.removed_rows), (0, 0));
    }

    #[test]
    fn missing_sheet_names_the_side() {
        let mut before = MemorySource::new().with_sheet("S", people());
        let mut after = MemorySource::new().with_sheet("T", people());
        let err = compare_sheet(&mut before, &mut after, "S", &[], &opts()).unwrap_err();
        assert!(matches!(
            err,
            CompareError::SheetNotFound { ref sheet, side: Side::After } if sheet == "S"
        ));
    }

    #[test]
    fn empty_before_sheet_is_an_error() {
        let mut before = MemorySource::new().with_sheet("S", vec![]);
        let mut after = MemorySource::new().with_sheet("S", people());
        let err = compare_sheet(&mut before, &mut after, "S", &[], &opts()).unwrap_err();
        assert!(matches!(err, CompareError::EmptySheet(_)));
    }

    #[test]
    fn header_only_before_is_not_empty() {
        let mut before = MemorySource::new().with_sheet("S", grid(&[&["id", "name"]]));
        let mut after = MemorySource::new()
            .with_sheet("S", grid(&[&["id", "name"], &["1", "Alice"]]));
        let result = compare_sheet(&mut before, &mut after, "S", &[], &opts()).unwrap();
        assert_eq!(result.added_rows, 1);
    }

    #[test]
    fn multi_sheet_run_skips_missing_and_keeps_order() {
        let mut before = MemorySource::new()
            .with_sheet("A", people())
            .with_sheet("OnlyBefore", people())
            .with_sheet("B", people());
        let mut changed = people();
        changed.push(vec!["3".into(), "Carol".into()]);
        let mut after = MemorySource::new()
            .with_sheet("B", changed)
            .with_sheet("A", people());
        let sheets: Vec<String> = ["A", "OnlyBefore", "B"].iter().map(|s| s.to_string()).collect();

        let cmp = compare_sheets(&mut before, &mut after, &sheets, &[], &opts()).unwrap();
        let names: Vec<_> = cmp.results.iter().map(|r| r.sheet_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(cmp.skipped.len(), 1);
        assert_eq!(cmp.skipped[0].sheet, "OnlyBefore");

        let stats = summarize(&cmp.results);
        assert_eq!(stats.sheets_compared, 2);
        assert_eq!(stats.added_rows, 1);
        assert_eq!(stats.changed_cells, 2);
    }

    #[test]
    fn multi_sheet_run_aborts_on_empty_sheet() {
        let mut before = MemorySource::new().with_sheet("A", vec![]);
        let mut after = MemorySource::new().with_sheet("A", people());
        let sheets = vec!["A".to_string()];
        assert!(compare_sheets(&mut before, &mut after, &sheets, &[], &opts()).is_err());
    }

    struct BrokenDiffer;

    impl LineDiffer for BrokenDiffer {
        fn diff(&self, _before: &[String], _after: &[String]) -> Vec<DiffOp> {
            vec![DiffOp::new(OpTag::Equal, 0..1, 0..1)]
        }
    }

    #[test]
    fn differ_that_drops_lines_is_reported() {
        let mut before = MemorySource::new().with_sheet("S", people());
        let mut after = MemorySource::new().with_sheet("S", people());
        let err = compare_sheet_with(&mut before, &mut after, "S", &[], true, &BrokenDiffer)
            .unwrap_err();
        assert!(matches!(err, CompareError::MalformedDiff { .. }));
    }
}
