//
// lib.rs
// SheetDiff-rs
//
// Library entry that re-exports modules so the binary and any external users can access CLI parsing, sheet sources, the diff engine, and report rendering.
//
pub mod cli;
pub mod columns;
pub mod compare;
pub mod diff;
pub mod differ;
pub mod encode;
pub mod error;
pub mod output;
pub mod source;
pub mod summary;
pub mod utils;

pub use cli::{build_options, Args, Options};
pub use columns::{ColumnFilter, IgnoreColumn};
pub use compare::{compare_sheet, compare_sheets, CompareOptions, Comparison, SkippedSheet};
pub use diff::{reconstruct, CellDiff, ChangeKind, RowRef, SheetDiffResult};
pub use differ::{DiffAlgorithm, DiffOp, LineDiffer, OpTag, SimilarDiffer};
pub use encode::{encode, Row};
pub use error::{CompareError, Side, SourceError};
pub use source::{open_source, CsvSource, MemorySource, TabularSource, WorkbookSource};
pub use summary::{summarize, SummaryStats};
