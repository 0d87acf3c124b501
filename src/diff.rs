use std::fmt;

use serde::{Serialize, Serializer};

use crate::columns::{column_name, ColumnFilter};
use crate::differ::{DiffOp, OpTag};
use crate::encode::Row;
use crate::error::CompareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    /// Equal cell of a modified row, kept as context.
    Unchanged,
}

impl ChangeKind {
    pub fn is_change(self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

/// Position of a record in the merged view of the diff.
///
/// The first merged position is the header line; every later one is a data row,
/// numbered from 0. Positions grow strictly while the operations are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowRef {
    Header,
    Data(usize),
}

impl RowRef {
    fn from_position(position: usize) -> Self {
        match position {
            0 => RowRef::Header,
            p => RowRef::Data(p - 1),
        }
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRef::Header => f.write_str("header"),
            RowRef::Data(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for RowRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowRef::Header => serializer.serialize_str("header"),
            RowRef::Data(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDiff {
    pub row: RowRef,
    pub col: usize,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub before: String,
    pub after: String,
    pub col_name: String,
    /// Line index in the before grid (0 is the header), when the row exists there.
    pub before_line: Option<usize>,
    pub after_line: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetDiffResult {
    pub sheet_name: String,
    pub diffs: Vec<CellDiff>,
    pub added_rows: usize,
    pub removed_rows: usize,
}

impl SheetDiffResult {
    /// Records that are real changes; `Unchanged` context cells are left out.
    pub fn changed_cells(&self) -> usize {
        self.diffs.iter().filter(|d| d.kind.is_change()).count()
    }

    pub fn is_identical(&self) -> bool {
        self.added_rows == 0 && self.removed_rows == 0 && self.changed_cells() == 0
    }
}

/// Output of [`reconstruct`], before the sheet name is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetChanges {
    pub diffs: Vec<CellDiff>,
    pub added_rows: usize,
    pub removed_rows: usize,
}

/// Checks that `ops` cover `0..before_len` and `0..after_len` contiguously and in order.
pub fn check_partition(
    ops: &[DiffOp],
    before_len: usize,
    after_len: usize,
) -> Result<(), CompareError> {
    let malformed = |detail: String| CompareError::MalformedDiff {
        detail,
        before_len,
        after_len,
    };

    let (mut b, mut a) = (0usize, 0usize);
    for (i, op) in ops.iter().enumerate() {
        if op.before.start != b || op.after.start != a {
            return Err(malformed(format!(
                "op {i} starts at ({}, {}) but cursors are at ({b}, {a})",
                op.before.start, op.after.start
            )));
        }
        if op.before.start > op.before.end
            || op.after.start > op.after.end
            || op.before.end > before_len
            || op.after.end > after_len
        {
            return Err(malformed(format!(
                "op {i} has spans {:?} / {:?} outside the input",
                op.before, op.after
            )));
        }
        let shape_ok = match op.tag {
            OpTag::Equal => op.before.len() == op.after.len(),
            OpTag::Delete => op.after.is_empty(),
            OpTag::Insert => op.before.is_empty(),
            OpTag::Replace => true,
        };
        if !shape_ok {
            return Err(malformed(format!(
                "op {i} ({:?}) has spans {:?} / {:?}",
                op.tag, op.before, op.after
            )));
        }
        b = op.before.end;
        a = op.after.end;
    }
    if b != before_len || a != after_len {
        return Err(malformed(format!("ops end at ({b}, {a})")));
    }
    Ok(())
}

struct Builder<'a> {
    before: &'a [Row],
    after: &'a [Row],
    header: &'a [String],
    filter: &'a ColumnFilter,
    only_changes: bool,
    position: usize,
    out: SheetChanges,
}

impl Builder<'_> {
    fn push(
        &mut self,
        col: usize,
        kind: ChangeKind,
        before: &str,
        after: &str,
        lines: (Option<usize>, Option<usize>),
    ) {
        self.out.diffs.push(CellDiff {
            row: RowRef::from_position(self.position),
            col,
            kind,
            before: before.to_string(),
            after: after.to_string(),
            col_name: column_name(self.header, col),
            before_line: lines.0,
            after_line: lines.1,
        });
    }

    fn removed_row(&mut self, line: usize) {
        let before = self.before;
        let row = before[line].as_slice();
        for (col, cell) in row.iter().enumerate() {
            if !self.filter.is_ignored(col) {
                self.push(col, ChangeKind::Removed, cell, "", (Some(line), None));
            }
        }
        self.out.removed_rows += 1;
        self.position += 1;
    }

    fn added_row(&mut self, line: usize) {
        let after = self.after;
        let row = after[line].as_slice();
        for (col, cell) in row.iter().enumerate() {
            if !self.filter.is_ignored(col) {
                self.push(col, ChangeKind::Added, "", cell, (None, Some(line)));
            }
        }
        self.out.added_rows += 1;
        self.position += 1;
    }

    fn paired_rows(&mut self, b_line: usize, a_line: usize) {
        let (before, after) = (self.before, self.after);
        let b_row = before[b_line].as_slice();
        let a_row = after[a_line].as_slice();
        let width = b_row.len().max(a_row.len());

        let cells: Vec<(usize, &str, &str)> = (0..width)
            .filter(|col| !self.filter.is_ignored(*col))
            .map(|col| {
                let b = b_row.get(col).map(String::as_str).unwrap_or("");
                let a = a_row.get(col).map(String::as_str).unwrap_or("");
                (col, b, a)
            })
            .collect();

        if cells.iter().any(|(_, b, a)| b != a) {
            let lines = (Some(b_line), Some(a_line));
            for (col, b, a) in cells {
                if b != a {
                    self.push(col, ChangeKind::Modified, b, a, lines);
                } else if !self.only_changes {
                    self.push(col, ChangeKind::Unchanged, b, a, lines);
                }
            }
        }
        self.position += 1;
    }
}

/// Turns line-level diff operations into cell-level records.
///
/// `header` labels columns and is normally line 0 of `before`. Replace runs pair rows
/// positionally; rows beyond the shorter side count as plain additions or removals.
pub fn reconstruct(
    ops: &[DiffOp],
    before: &[Row],
    after: &[Row],
    header: &[String],
    filter: &ColumnFilter,
    only_changes: bool,
) -> Result<SheetChanges, CompareError> {
    check_partition(ops, before.len(), after.len())?;

    let mut builder = Builder {
        before,
        after,
        header,
        filter,
        only_changes,
        position: 0,
        out: SheetChanges::default(),
    };

    for op in ops {
        match op.tag {
            OpTag::Equal => builder.position += op.before.len(),
            OpTag::Delete => op.before.clone().for_each(|l| builder.removed_row(l)),
            OpTag::Insert => op.after.clone().for_each(|l| builder.added_row(l)),
            OpTag::Replace => {
                let paired = op.before.len().min(op.after.len());
                for k in 0..paired {
                    builder.paired_rows(op.before.start + k, op.after.start + k);
                }
                for line in op.before.start + paired..op.before.end {
                    builder.removed_row(line);
                }
                for line in op.after.start + paired..op.after.end {
                    builder.added_row(line);
                }
            }
        }
    }

    Ok(builder.out)
}
