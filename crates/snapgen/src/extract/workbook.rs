use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{
    open_workbook_auto, open_workbook_auto_from_rs, Data, ExcelDateTime, Reader, Sheets,
};
use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::error::ExtractError;

/// One named sheet holding cell display text.
///
/// `rows` is anchored at `origin` (row, col); anything outside reads as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    origin: (u32, u32),
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self::with_origin(name, (0, 0), rows)
    }

    pub fn with_origin(name: impl Into<String>, origin: (u32, u32), rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            origin,
            rows,
        }
    }

    /// Convenience for building sheets from string literals.
    pub fn from_rows<S: AsRef<str>>(name: impl Into<String>, rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.as_ref().to_string()).collect())
            .collect();
        Self::new(name, rows)
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Display text at an absolute zero-based position.
    pub fn cell(&self, row: u32, col: u32) -> &str {
        let (origin_row, origin_col) = self.origin;
        if row < origin_row || col < origin_col {
            return "";
        }
        self.rows
            .get((row - origin_row) as usize)
            .and_then(|r| r.get((col - origin_col) as usize))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// An in-memory workbook: ordered, named sheets of cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Opens `.xlsx`, `.xlsm`, `.xlsb`, `.xls` or `.ods` from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let sheets = open_workbook_auto(path.as_ref())
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;
        Self::from_reader(sheets)
    }

    /// Parses a workbook from raw bytes, sniffing the container format.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ExtractError> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ExtractError::Workbook(e.to_string()))?;
        Self::from_reader(sheets)
    }

    fn from_reader<RS: Read + Seek>(mut reader: Sheets<RS>) -> Result<Self, ExtractError> {
        let names = reader.sheet_names().to_owned();
        if names.is_empty() {
            return Err(ExtractError::Workbook("workbook contains no sheets".to_string()));
        }

        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            match reader.worksheet_range(&name) {
                Ok(range) => {
                    let origin = range.start().unwrap_or((0, 0));
                    let rows = range
                        .rows()
                        .map(|row| row.iter().map(cell_text).collect())
                        .collect();
                    sheets.push(Sheet::with_origin(name, origin, rows));
                }
                Err(e) => {
                    // Chart sheets and similar have no cell grid; keep the
                    // name so sheet resolution order is unchanged.
                    warn!("Sheet '{}' has no readable cells: {}", name, e);
                    sheets.push(Sheet::empty(name));
                }
            }
        }

        debug!("Loaded workbook with {} sheet(s)", sheets.len());
        Ok(Self { sheets })
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Coerces a cell to the text a spreadsheet would display.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => format_datetime(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Dates read as `YYYY-MM-DD`, with the time only when it is not midnight.
/// Durations read as `[h]:mm:ss`.
fn format_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(d) => {
                let secs = d.num_seconds();
                format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            None => format_number(dt.as_f64()),
        };
    }

    match dt.as_datetime() {
        Some(value) if value.time() == NaiveTime::MIN => value.format("%Y-%m-%d").to_string(),
        Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format_number(dt.as_f64()),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
