//! Heading and end-row resolution.
//!
//! Computed once per worksheet, before row iteration begins.

use crate::types::CellValue;
use crate::worksheet::Worksheet;

/// Declared heading convention for a tabular import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingKind {
    /// No heading row; projected records use positional field names.
    #[default]
    None,
    /// A single heading row of field names.
    Flat,
    /// Two heading rows: categories above field names, collapsed into
    /// `category.field` composite keys.
    Grouped,
}

/// Ordered field names extracted from the heading block. Immutable once
/// built; shared by every row projection in the worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadingRow {
    keys: Vec<String>,
}

impl HeadingRow {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Field name for a 0-based column: the heading key when one exists,
    /// else the column position rendered as a string.
    pub fn field_name(&self, col: usize) -> String {
        match self.keys.get(col) {
            Some(key) if !key.is_empty() => key.clone(),
            _ => col.to_string(),
        }
    }
}

fn heading_text(cell: &CellValue) -> String {
    cell.resolve(true, false).to_string()
}

fn row_cells(sheet: &dyn Worksheet, row: u32, end_column: Option<u16>) -> Vec<CellValue> {
    let mut cells = sheet
        .rows(row, row)
        .next()
        .map(|raw| raw.cells)
        .unwrap_or_default();
    if let Some(end) = end_column {
        cells.truncate(end as usize + 1);
    }
    cells
}

/// Extract the heading row for an import. `heading_row` is the 1-based row
/// of the heading block (the category row for grouped headings).
pub(crate) fn extract(
    sheet: &dyn Worksheet,
    kind: HeadingKind,
    heading_row: u32,
    end_column: Option<u16>,
) -> HeadingRow {
    match kind {
        HeadingKind::None => HeadingRow::empty(),
        HeadingKind::Flat => {
            let keys = row_cells(sheet, heading_row, end_column)
                .iter()
                .map(heading_text)
                .collect();
            HeadingRow::from_keys(keys)
        }
        HeadingKind::Grouped => {
            let categories = row_cells(sheet, heading_row, end_column);
            let fields = row_cells(sheet, heading_row + 1, end_column);

            // Blank category cells inherit the nearest non-empty category to
            // their left (the merged-cell convention).
            let mut current_category = String::new();
            let mut keys = Vec::with_capacity(fields.len().max(categories.len()));
            for col in 0..fields.len().max(categories.len()) {
                let category = categories.get(col).map(heading_text).unwrap_or_default();
                if !category.is_empty() {
                    current_category = category;
                }
                let field = fields.get(col).map(heading_text).unwrap_or_default();
                let key = match (current_category.is_empty(), field.is_empty()) {
                    (false, false) => format!("{current_category}.{field}"),
                    (true, false) => field,
                    (false, true) => current_category.clone(),
                    (true, true) => String::new(),
                };
                keys.push(key);
            }
            HeadingRow::from_keys(keys)
        }
    }
}

/// First data row, given the requested start row and the heading block the
/// iteration must not overlap.
pub(crate) fn data_start_row(kind: HeadingKind, heading_row: u32, requested: u32) -> u32 {
    match kind {
        HeadingKind::None => requested,
        HeadingKind::Flat => requested.max(heading_row + 1),
        HeadingKind::Grouped => requested.max(heading_row + 2),
    }
}

/// Inclusive end row: the declared limit clamped to the worksheet's highest
/// row, or the highest row when no limit is declared.
pub(crate) fn find_end_row(row_limit: Option<u32>, highest_row: u32) -> u32 {
    match row_limit {
        Some(limit) => limit.min(highest_row),
        None => highest_row,
    }
}
