use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use encoding_rs::WINDOWS_1252;
use glob::Pattern;

/// Reads a text file as UTF-8, falling back to Windows-1252 for legacy exports.
pub fn read_text_best_effort(path: &Path, normalize_eol: bool) -> Result<String> {
    let bytes = fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            let (res, _, _) = WINDOWS_1252.decode(err.as_bytes());
            res.into_owned()
        }
    };
    let content = content.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(content);

    if normalize_eol {
        Ok(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Ok(content)
    }
}

/// `output/diff_<timestamp>.txt` (or `.json`).
pub fn default_output_path(json: bool) -> PathBuf {
    let ext = if json { "json" } else { "txt" };
    PathBuf::from("output").join(format!(
        "diff_{}.{ext}",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Sheets to compare, before-order first, then sheets only the after side has.
///
/// With no patterns every sheet is selected. A sheet present on one side only is kept
/// so the comparison can report it as skipped.
pub fn select_sheets(before: &[String], after: &[String], patterns: &[Pattern]) -> Vec<String> {
    let wanted = |name: &str| patterns.is_empty() || patterns.iter().any(|p| p.matches(name));

    let mut selected: Vec<String> = Vec::new();
    for name in before.iter().chain(after.iter()) {
        if wanted(name) && !selected.contains(name) {
            selected.push(name.clone());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_before_order_then_after_only() {
        let got = select_sheets(&names(&["B", "A"]), &names(&["A", "C", "B"]), &[]);
        assert_eq!(got, names(&["B", "A", "C"]));
    }

    #[test]
    fn glob_patterns_filter_both_sides() {
        let patterns = vec![Pattern::new("Q*").unwrap()];
        let got = select_sheets(&names(&["Q1", "Notes"]), &names(&["Q1", "Q2"]), &patterns);
        assert_eq!(got, names(&["Q1", "Q2"]));
    }

    #[test]
    fn exact_name_is_a_valid_pattern() {
        let patterns = vec![Pattern::new("Sheet1").unwrap()];
        let got = select_sheets(&names(&["Sheet1", "Sheet2"]), &names(&["Sheet1"]), &patterns);
        assert_eq!(got, names(&["Sheet1"]));
    }

    #[test]
    fn default_output_path_lives_under_output() {
        let path = default_output_path(true);
        assert!(path.starts_with("output"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    }

    #[test]
    fn latin1_files_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        fs::write(&path, b"caf\xe9\r\nna\xefve\r\n").unwrap();
        let text = read_text_best_effort(&path, true).unwrap();
        assert_eq!(text, "café\nnaïve\n");
    }
}
