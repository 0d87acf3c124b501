use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::Timelike;
use log::debug;

use crate::encode::Row;
use crate::error::SourceError;
use crate::utils::read_text_best_effort;

/// Sheet name reported by single-sheet sources such as CSV files.
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// Anything that can list sheets and hand back their rows as display strings.
pub trait TabularSource {
    fn sheet_names(&self) -> Vec<String>;

    fn rows(&mut self, sheet: &str) -> Result<Vec<Row>, SourceError>;

    fn has_sheet(&self, sheet: &str) -> bool {
        self.sheet_names().iter().any(|s| s == sheet)
    }
}

/// Named grids held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: Vec<(String, Vec<Row>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.sheets.push((name.into(), rows));
        self
    }
}

impl TabularSource for MemorySource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn rows(&mut self, sheet: &str) -> Result<Vec<Row>, SourceError> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| SourceError::SheetRead {
                sheet: sheet.to_string(),
                reason: "no such sheet".into(),
            })
    }
}

/// Spreadsheet workbook (xlsx, xlsm, xlsb, xls, ods) read through calamine.
pub struct WorkbookSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let workbook = open_workbook_auto(path).map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(WorkbookSource {
            path: path.to_path_buf(),
            workbook,
        })
    }
}

impl TabularSource for WorkbookSource {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn rows(&mut self, sheet: &str) -> Result<Vec<Row>, SourceError> {
        debug!("reading sheet '{sheet}' from {:?}", self.path);
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| SourceError::SheetRead {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            })?;
        Ok(range_to_rows(&range))
    }
}

/// Renders a cell the way a reader sees it in the sheet.
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Bool(true) => "TRUE".into(),
        Data::Bool(false) => "FALSE".into(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 => {
                ts.format("%Y-%m-%d").to_string()
            }
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        other => other.to_string(),
    }
}

/// Grid anchored at A1 with trailing empty cells trimmed from every row.
pub fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Row> = vec![Vec::new(); row_offset];
    for cells in range.rows() {
        let mut row: Row = vec![String::new(); col_offset];
        row.extend(cells.iter().map(render_cell));
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
        rows.push(row);
    }
    rows
}

/// Delimited text file exposed as a single sheet named [`CSV_SHEET_NAME`].
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    text: String,
}

impl CsvSource {
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, SourceError> {
        let text = read_text_best_effort(path, true).map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_text(path, delimiter, text))
    }

    pub fn from_text(path: &Path, delimiter: u8, text: String) -> Self {
        CsvSource {
            path: path.to_path_buf(),
            delimiter,
            text,
        }
    }
}

impl TabularSource for CsvSource {
    fn sheet_names(&self) -> Vec<String> {
        vec![CSV_SHEET_NAME.to_string()]
    }

    fn rows(&mut self, sheet: &str) -> Result<Vec<Row>, SourceError> {
        let read_err = |reason: String| SourceError::SheetRead {
            sheet: sheet.to_string(),
            reason,
        };
        if sheet != CSV_SHEET_NAME {
            return Err(read_err(format!("{:?} only has sheet {CSV_SHEET_NAME}", self.path)));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(self.text.as_bytes());

        reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect::<Row>())
                    .map_err(|e| read_err(e.to_string()))
            })
            .collect()
    }
}

/// Picks a source implementation from the file extension.
pub fn open_source(path: &Path) -> Result<Box<dyn TabularSource>, SourceError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::open(path, b',')?)),
        "tsv" | "tab" => Ok(Box::new(CsvSource::open(path, b'\t')?)),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods" => {
            Ok(Box::new(WorkbookSource::open(path)?))
        }
        _ => Err(SourceError::UnsupportedFormat(path.to_path_buf())),
    }
}
