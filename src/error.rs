use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Which of the two compared sources an error or record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => f.write_str("before"),
            Side::After => f.write_str("after"),
        }
    }
}

/// Failures raised by a tabular source while opening a file or reading a sheet.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("failed to read sheet '{sheet}': {reason}")]
    SheetRead { sheet: String, reason: String },

    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("sheet '{sheet}' not found in {side} source")]
    SheetNotFound { sheet: String, side: Side },

    #[error("sheet '{0}' has no rows in the before source (no header row)")]
    EmptySheet(String),

    #[error("row {row} cannot be encoded: {reason}")]
    Encoding { row: usize, reason: String },

    #[error(
        "diff operations do not partition the input: {detail} \
         (before lines: {before_len}, after lines: {after_len})"
    )]
    MalformedDiff {
        detail: String,
        before_len: usize,
        after_len: usize,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl CompareError {
    /// True for the only error a multi-sheet run should skip over instead of aborting.
    pub fn is_sheet_not_found(&self) -> bool {
        matches!(self, CompareError::SheetNotFound { .. })
    }
}
