use std::collections::BTreeSet;

use log::debug;

/// One ignore specification after resolving it against a sheet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreColumn {
    ByName(String),
    ByIndex(usize),
}

impl IgnoreColumn {
    /// Exact header-name match wins; otherwise a numeric spec is a 0-based column index.
    pub fn resolve(raw: &str, header: &[String]) -> Self {
        if header.iter().any(|name| name == raw) {
            return IgnoreColumn::ByName(raw.to_string());
        }
        match raw.trim().parse::<usize>() {
            Ok(idx) => IgnoreColumn::ByIndex(idx),
            Err(_) => IgnoreColumn::ByName(raw.to_string()),
        }
    }
}

/// Set of column indices excluded from reporting for one sheet.
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    ignored: BTreeSet<usize>,
}

impl ColumnFilter {
    pub fn new(specs: &[IgnoreColumn], header: &[String]) -> Self {
        let mut ignored = BTreeSet::new();
        for spec in specs {
            match spec {
                IgnoreColumn::ByIndex(idx) => {
                    ignored.insert(*idx);
                }
                IgnoreColumn::ByName(name) => {
                    let before = ignored.len();
                    ignored.extend(
                        header
                            .iter()
                            .enumerate()
                            .filter(|(_, h)| *h == name)
                            .map(|(i, _)| i),
                    );
                    if ignored.len() == before {
                        debug!("ignore column '{name}' matches no header cell");
                    }
                }
            }
        }
        ColumnFilter { ignored }
    }

    /// Resolves raw CLI strings and builds the filter in one step.
    pub fn from_raw(raw: &[String], header: &[String]) -> Self {
        let specs: Vec<_> = raw
            .iter()
            .map(|r| IgnoreColumn::resolve(r, header))
            .collect();
        Self::new(&specs, header)
    }

    pub fn is_ignored(&self, col: usize) -> bool {
        self.ignored.contains(&col)
    }

    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
    }
}

/// `header[col]` when present, else `Column <col+1>`.
pub fn column_name(header: &[String], col: usize) -> String {
    match header.get(col) {
        Some(name) => name.clone(),
        None => format!("Column {}", col + 1),
    }
}

/// Spreadsheet-style letters for a 0-based column index: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
