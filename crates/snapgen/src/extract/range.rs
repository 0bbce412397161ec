use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// A rectangular, inclusive, zero-based cell region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtractionRange {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: u32,
}

impl ExtractionRange {
    pub fn new(
        start_col: u32,
        start_row: u32,
        end_col: u32,
        end_row: u32,
    ) -> Result<Self, ExtractError> {
        let range = Self {
            start_col,
            start_row,
            end_col,
            end_row,
        };
        if !range.is_ordered() {
            return Err(ExtractError::InvalidRange(format!(
                "{} ends before it starts",
                range
            )));
        }
        Ok(range)
    }

    /// `B31:K43` on the quarterly metrics workbook.
    pub fn quarterly_metrics() -> Self {
        Self {
            start_col: 1,
            start_row: 30,
            end_col: 10,
            end_row: 42,
        }
    }

    /// `B53:K55` on the consensus workbook.
    pub fn consensus() -> Self {
        Self {
            start_col: 1,
            start_row: 52,
            end_col: 10,
            end_row: 54,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start_col <= self.end_col && self.start_row <= self.end_row
    }

    pub fn width(&self) -> usize {
        (self.end_col - self.start_col + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.end_row - self.start_row + 1) as usize
    }
}

fn column_name(mut col: u32) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

fn parse_cell(cell: &str) -> Result<(u32, u32), ExtractError> {
    let cell = cell.trim();
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ExtractError::InvalidRange(format!("missing row in '{}'", cell)))?;
    let (letters, digits) = cell.split_at(split);

    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ExtractError::InvalidRange(format!(
            "invalid column in '{}'",
            cell
        )));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| ExtractError::InvalidRange(format!("column overflow in '{}'", cell)))?;
    }

    let row: u32 = digits
        .parse()
        .map_err(|_| ExtractError::InvalidRange(format!("invalid row in '{}'", cell)))?;
    if row == 0 {
        return Err(ExtractError::InvalidRange(format!(
            "rows start at 1 in '{}'",
            cell
        )));
    }

    Ok((col - 1, row - 1))
}

impl FromStr for ExtractionRange {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| ExtractError::InvalidRange(format!("expected 'A1:B2', got '{}'", s)))?;
        let (start_col, start_row) = parse_cell(start)?;
        let (end_col, end_row) = parse_cell(end)?;
        Self::new(start_col, start_row, end_col, end_row)
    }
}

impl TryFrom<String> for ExtractionRange {
    type Error = ExtractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExtractionRange> for String {
    fn from(range: ExtractionRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for ExtractionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_name(self.start_col),
            self.start_row + 1,
            column_name(self.end_col),
            self.end_row + 1
        )
    }
}
