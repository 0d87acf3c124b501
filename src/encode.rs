use crate::error::CompareError;

pub type Row = Vec<String>;

pub const SEPARATOR: char = ',';

/// Line for a row holding one empty cell. `\e` is never produced by cell escaping,
/// so it cannot clash with the empty row's empty line.
const SINGLE_EMPTY_CELL: &str = "\\e";

fn escape_cell(cell: &str, out: &mut String) {
    for ch in cell.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            SEPARATOR => {
                out.push('\\');
                out.push(SEPARATOR);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

/// Joins one row into a single comparison line.
///
/// Distinct rows always encode to distinct lines, including `[]` and `[""]`.
pub fn encode_row(row: &[String]) -> String {
    if let [only] = row {
        if only.is_empty() {
            return SINGLE_EMPTY_CELL.to_string();
        }
    }
    let mut line = String::with_capacity(row.iter().map(|c| c.len() + 1).sum());
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            line.push(SEPARATOR);
        }
        escape_cell(cell, &mut line);
    }
    line
}

/// Encodes every row of a grid, one line per row.
pub fn encode(rows: &[Row]) -> Result<Vec<String>, CompareError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let line = encode_row(row);
            if line.contains(['\n', '\r']) {
                return Err(CompareError::Encoding {
                    row: idx,
                    reason: "encoded line still contains a line break".into(),
                });
            }
            Ok(line)
        })
        .collect()
}

/// Inverse of [`encode_row`].
pub fn decode_line(line: &str) -> Row {
    match line {
        "" => return Vec::new(),
        SINGLE_EMPTY_CELL => return vec![String::new()],
        _ => {}
    }
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => current.push(other),
                None => current.push('\\'),
            },
            SEPARATOR => cells.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    cells.push(current);
    cells
}
