//! Forward-fill passes that rebuild merged-cell labels.
//!
//! Spreadsheet tools store a merged cell's value only in its leftmost (or
//! topmost) cell. Row 1 of an extracted block holds merged period headers
//! and column 0 holds category labels spanning several data rows.

/// Row that carries merged headers.
const HEADER_ROW: usize = 1;
/// First column of the header row that takes part in fill-right.
const FILL_RIGHT_FROM: usize = 3;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Applies fill-right to row 1 and fill-down to column 0 of rows after it.
pub fn forward_fill(grid: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut last_category: Option<String> = None;

    grid.iter()
        .enumerate()
        .map(|(row_index, row)| {
            let mut row = row.clone();

            if row_index == HEADER_ROW {
                fill_right(&mut row);
            }

            if row_index > HEADER_ROW {
                if let Some(first) = row.first_mut() {
                    let current = first.trim();
                    if !current.is_empty() {
                        last_category = Some(current.to_string());
                    } else if let Some(category) = &last_category {
                        *first = category.clone();
                    }
                }
            }

            row
        })
        .collect()
}

fn fill_right(row: &mut [String]) {
    let mut last: Option<String> = None;
    for cell in row.iter_mut().skip(FILL_RIGHT_FROM) {
        if !is_blank(cell) {
            last = Some(cell.clone());
        } else if let Some(value) = &last {
            *cell = value.clone();
        }
    }
}
