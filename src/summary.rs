use serde::Serialize;

use crate::diff::SheetDiffResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub sheets_compared: usize,
    pub changed_cells: usize,
    pub added_rows: usize,
    pub removed_rows: usize,
}

/// Folds per-sheet results into run totals.
///
/// `changed_cells` counts only real changes: `Unchanged` context records emitted when
/// `only_changes` is off are excluded, so it equals the total record count only when
/// `only_changes` is set.
pub fn summarize(results: &[SheetDiffResult]) -> SummaryStats {
    results
        .iter()
        .fold(SummaryStats::default(), |mut stats, r| {
            stats.sheets_compared += 1;
            stats.changed_cells += r.changed_cells();
            stats.added_rows += r.added_rows;
            stats.removed_rows += r.removed_rows;
            stats
        })
}
