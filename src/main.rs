use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::info;

use sheetdiff::output::{write_report, OutputTarget};
use sheetdiff::utils::select_sheets;
use sheetdiff::{build_options, compare_sheets, open_source, summarize, Args};

fn main() -> Result<()> {
    env_logger::init();
    let start = Instant::now();

    let args = Args::parse();
    let opts = build_options(&args)?;

    let mut before = open_source(&args.before)
        .with_context(|| format!("Failed to load before file {:?}", args.before))?;
    let mut after = open_source(&args.after)
        .with_context(|| format!("Failed to load after file {:?}", args.after))?;

    let sheets = select_sheets(
        &before.sheet_names(),
        &after.sheet_names(),
        &opts.sheet_patterns,
    );
    if sheets.is_empty() {
        println!("{}", "No sheets to compare".yellow());
        return Ok(());
    }
    info!("comparing {} sheet(s): {:?}", sheets.len(), sheets);

    let comparison = compare_sheets(
        before.as_mut(),
        after.as_mut(),
        &sheets,
        &opts.ignore_columns,
        &opts.compare,
    )
    .context("Diff failed")?;

    for skipped in &comparison.skipped {
        eprintln!("{}", format!("Skipped: {}", skipped.reason).yellow());
    }

    write_report(&comparison, opts.mode, &opts.target).context("Failed to generate output")?;
    if let OutputTarget::File(path) = &opts.target {
        eprintln!("{}", format!("Diff saved to: {}", path.display()).green());
    }

    if opts.print_summary {
        let stats = summarize(&comparison.results);
        eprintln!("{}", "\nSummary:".cyan());
        eprintln!("{}", format!("  Sheets compared: {}", stats.sheets_compared).cyan());
        eprintln!("{}", format!("  Changed cells:   {}", stats.changed_cells).cyan());
        eprintln!("{}", format!("  Added rows:      {}", stats.added_rows).cyan());
        eprintln!("{}", format!("  Removed rows:    {}", stats.removed_rows).cyan());
        eprintln!(
            "{}",
            format!("  Execution time:  {:.3?}", start.elapsed()).cyan()
        );
    }

    Ok(())
}
