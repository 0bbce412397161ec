//! Spreadsheet range extraction with forward-fill normalization.
//!
//! A fixed cell block is read from the sheet selected for the target company,
//! merged labels are reconstructed, and the rows are flattened into one
//! delimited text block for inclusion in a prompt. Embedded delimiters are
//! not escaped.

pub mod fill;
pub mod range;
pub mod sheet;
pub mod workbook;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use fill::forward_fill;
pub use range::ExtractionRange;
pub use sheet::{resolve_sheet, simplify_entity_name, SheetMatch};
pub use workbook::{Sheet, Workbook};

/// The two kinds of workbook the analyst can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadsheetCategory {
    QuarterlyMetrics,
    Consensus,
}

impl std::fmt::Display for SpreadsheetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadsheetCategory::QuarterlyMetrics => write!(f, "Quarterly Metrics"),
            SpreadsheetCategory::Consensus => write!(f, "Consensus Data"),
        }
    }
}

/// Reads `range` from `sheet` as a fixed-width grid of display text.
pub fn read_grid(sheet: &Sheet, range: &ExtractionRange) -> Vec<Vec<String>> {
    (range.start_row..=range.end_row)
        .map(|row| {
            (range.start_col..=range.end_col)
                .map(|col| sheet.cell(row, col).to_string())
                .collect()
        })
        .collect()
}

/// Joins cells with `delimiter` and rows with `\n`.
pub fn serialize_grid(grid: &[Vec<String>], delimiter: char) -> String {
    let separator = delimiter.to_string();
    grid.iter()
        .map(|row| row.join(&separator))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts the normalized text block for `entity`, or `None` when no sheet
/// resolves.
pub fn extract(
    workbook: &Workbook,
    entity: &str,
    range: &ExtractionRange,
    delimiter: char,
) -> Option<String> {
    let (sheet, how) = resolve_sheet(workbook, entity)?;
    debug!(
        "Extracting {} from sheet '{}' ({:?} match)",
        range, sheet.name, how
    );

    let grid = read_grid(sheet, range);
    let filled = forward_fill(&grid);
    Some(serialize_grid(&filled, delimiter))
}
