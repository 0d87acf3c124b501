use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glob::Pattern;

use crate::compare::CompareOptions;
use crate::differ::DiffAlgorithm;
use crate::output::{OutputMode, OutputTarget};
use crate::utils::default_output_path;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare two spreadsheets cell by cell", long_about = None)]
pub struct Args {
    /// Path to the 'before' file (xlsx, xlsm, xlsb, xls, ods, csv, tsv)
    #[arg(short, long)]
    pub before: PathBuf,

    /// Path to the 'after' file
    #[arg(short, long)]
    pub after: PathBuf,

    /// Show only changed cells (no unchanged context cells for modified rows)
    #[arg(long)]
    pub only_changes: bool,

    /// Columns to ignore, by header name or 0-based index (can be repeated or comma separated)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub ignore_columns: Vec<String>,

    /// Sheet name or glob pattern to compare (default: all sheets)
    #[arg(long)]
    pub sheet: Vec<String>,

    /// Write a per-sheet summary and print summary statistics
    #[arg(long)]
    pub summary: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Output file path, or '-' for stdout (default: output/diff_<timestamp>.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Line diff algorithm
    #[arg(long, value_enum, default_value_t = DiffAlgorithm::Myers)]
    pub algorithm: DiffAlgorithm,
}

#[derive(Debug)]
pub struct Options {
    pub compare: CompareOptions,
    pub ignore_columns: Vec<String>,
    pub sheet_patterns: Vec<Pattern>,
    pub mode: OutputMode,
    pub target: OutputTarget,
    pub print_summary: bool,
}

pub fn build_options(args: &Args) -> Result<Options> {
    let sheet_patterns = args
        .sheet
        .iter()
        .map(|s| Pattern::new(s).with_context(|| format!("Invalid sheet pattern: {s}")))
        .collect::<Result<Vec<_>>>()?;

    let ignore_columns = args
        .ignore_columns
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let mode = if args.json {
        OutputMode::Json
    } else if args.summary {
        OutputMode::TextSummary
    } else {
        OutputMode::TextFull
    };

    let target = match &args.output {
        Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
        Some(path) => OutputTarget::File(path.clone()),
        None => OutputTarget::File(default_output_path(args.json)),
    };

    Ok(Options {
        compare: CompareOptions {
            only_changes: args.only_changes,
            algorithm: args.algorithm,
        },
        ignore_columns,
        sheet_patterns,
        mode,
        target,
        print_summary: args.summary,
    })
}
