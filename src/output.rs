use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::columns::column_letter;
use crate::compare::{Comparison, SkippedSheet};
use crate::diff::{CellDiff, ChangeKind, SheetDiffResult};
use crate::summary::{summarize, SummaryStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    TextFull,
    TextSummary,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sheets: &'a [SheetDiffResult],
    skipped: &'a [SkippedSheet],
    summary: SummaryStats,
}

/// Spreadsheet reference such as `B3` for the line the record refers to.
fn cell_ref(d: &CellDiff) -> String {
    let line = match d.kind {
        ChangeKind::Added => d.after_line,
        _ => d.before_line,
    };
    match line {
        Some(line) => format!("{}{}", column_letter(d.col), line + 1),
        None => column_letter(d.col),
    }
}

pub fn format_diff_line(d: &CellDiff) -> String {
    let prefix = format!("row {} {} ({})", d.row, cell_ref(d), d.col_name);
    match d.kind {
        ChangeKind::Modified => {
            format!("[MODIFIED] {prefix}: {:?} -> {:?}\n", d.before, d.after)
        }
        ChangeKind::Added => format!("[ADDED] {prefix}: {:?}\n", d.after),
        ChangeKind::Removed => format!("[REMOVED] {prefix}: {:?}\n", d.before),
        ChangeKind::Unchanged => format!("[  ] {prefix}: {:?}\n", d.before),
    }
}

pub fn render_text(comparison: &Comparison, summary_only: bool) -> String {
    let mut out = String::new();
    for result in &comparison.results {
        if summary_only {
            let _ = writeln!(
                out,
                "Sheet: {} - Changes: {}",
                result.sheet_name,
                result.changed_cells()
            );
        } else {
            let _ = writeln!(out, "\n===== Sheet: {} =====", result.sheet_name);
            let _ = writeln!(
                out,
                "Added rows: {}, removed rows: {}",
                result.added_rows, result.removed_rows
            );
            for d in &result.diffs {
                out.push_str(&format_diff_line(d));
            }
        }
    }
    for skipped in &comparison.skipped {
        let _ = writeln!(out, "Skipped sheet: {} ({})", skipped.sheet, skipped.reason);
    }
    out
}

pub fn render_json(comparison: &Comparison) -> Result<String> {
    let report = JsonReport {
        sheets: &comparison.results,
        skipped: &comparison.skipped,
        summary: summarize(&comparison.results),
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}

pub fn render(comparison: &Comparison, mode: OutputMode) -> Result<String> {
    match mode {
        OutputMode::TextFull => Ok(render_text(comparison, false)),
        OutputMode::TextSummary => Ok(render_text(comparison, true)),
        OutputMode::Json => render_json(comparison),
    }
}

/// Renders the report and writes it to `target`, creating parent directories.
pub fn write_report(comparison: &Comparison, mode: OutputMode, target: &OutputTarget) -> Result<()> {
    let content = render(comparison, mode)?;
    match target {
        OutputTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Cannot create directory {parent:?}"))?;
                }
            }
            fs::write(path, content).with_context(|| format!("Cannot write report to {path:?}"))?;
        }
    }
    Ok(())
}
