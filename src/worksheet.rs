//! Read-side worksheet contract and adapters.
//!
//! The import engine only ever sees the [`Worksheet`] trait: a highest-row
//! count, a bounded forward row iterator, and random cell access for mapped
//! reads. Adapters are provided for calamine ranges (xlsx files) and for
//! in-memory sheets.

use calamine::{Data, Range};

use crate::error::{SheetError, SheetResult};
use crate::types::CellValue;

/// One raw row read from a worksheet. `index` is 1-based and matches the
/// source sheet's row number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub index: u32,
    pub cells: Vec<CellValue>,
}

/// Read-side worksheet source.
///
/// Rows are 1-based (sheet convention); columns are 0-based indices.
pub trait Worksheet {
    /// Highest 1-based row number containing data; 0 for an empty sheet.
    fn highest_row(&self) -> u32;

    /// Rows in the inclusive window `[start, end]`, ascending. Rows inside
    /// the window with no data still yield, with empty cells, so indices
    /// stay contiguous.
    fn rows(&self, start: u32, end: u32) -> Box<dyn Iterator<Item = RawRow> + '_>;

    /// Cell at a 1-based row and 0-based column; empty when out of range.
    fn cell(&self, row: u32, col: u16) -> CellValue;
}

//==============================================================================
// A1-style cell references
//==============================================================================

/// A parsed A1-style cell reference: `"B2"` → row 2, column index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference such as `"A1"`, `"C10"` or `"AA3"`.
    pub fn parse(reference: &str) -> SheetResult<Self> {
        let reference = reference.trim();
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SheetError::CellRef(reference.to_string()))?;
        let (letters, digits) = reference.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SheetError::CellRef(reference.to_string()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            let c = c.to_ascii_uppercase();
            col = col * 26 + (c as u32 - 'A' as u32 + 1);
        }
        let col = col - 1;
        if col > u16::MAX as u32 {
            return Err(SheetError::CellRef(reference.to_string()));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| SheetError::CellRef(reference.to_string()))?;
        if row == 0 {
            return Err(SheetError::CellRef(reference.to_string()));
        }

        Ok(Self {
            row,
            col: col as u16,
        })
    }
}

impl std::str::FromStr for CellRef {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse(s)
    }
}

//==============================================================================
// In-memory sheets
//==============================================================================

/// In-memory worksheet for tests and programmatic sources.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    rows: Vec<Vec<CellValue>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        self.rows.push(cells);
    }
}

impl Worksheet for MemorySheet {
    fn highest_row(&self) -> u32 {
        self.rows.len() as u32
    }

    fn rows(&self, start: u32, end: u32) -> Box<dyn Iterator<Item = RawRow> + '_> {
        let start = start.max(1);
        let end = end.min(self.highest_row());
        Box::new((start..=end).map(move |index| RawRow {
            index,
            cells: self.rows[(index - 1) as usize].clone(),
        }))
    }

    fn cell(&self, row: u32, col: u16) -> CellValue {
        row.checked_sub(1)
            .and_then(|r| self.rows.get(r as usize))
            .and_then(|cells| cells.get(col as usize))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }
}

//==============================================================================
// Calamine adapter
//==============================================================================

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        // Serial datetimes are kept as raw serials; ISO variants as text.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

impl Worksheet for Range<Data> {
    fn highest_row(&self) -> u32 {
        self.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    fn rows(&self, start: u32, end: u32) -> Box<dyn Iterator<Item = RawRow> + '_> {
        let start = start.max(1);
        let end = end.min(Worksheet::highest_row(self));
        let width = self.end().map(|(_, col)| col + 1).unwrap_or(0);

        Box::new((start..=end).map(move |index| {
            let cells = (0..width)
                .map(|col| {
                    self.get_value((index - 1, col))
                        .map(convert_cell)
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            RawRow { index, cells }
        }))
    }

    fn cell(&self, row: u32, col: u16) -> CellValue {
        row.checked_sub(1)
            .and_then(|r| self.get_value((r, col as u32)))
            .map(convert_cell)
            .unwrap_or(CellValue::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref_parse() {
        assert_eq!(CellRef::parse("A1").unwrap(), CellRef::new(1, 0));
        assert_eq!(CellRef::parse("B2").unwrap(), CellRef::new(2, 1));
        assert_eq!(CellRef::parse("Z10").unwrap(), CellRef::new(10, 25));
        assert_eq!(CellRef::parse("AA3").unwrap(), CellRef::new(3, 26));
        assert_eq!(CellRef::parse("ab12").unwrap(), CellRef::new(12, 27));
    }

    #[test]
    fn test_cell_ref_parse_rejects_garbage() {
        assert!(CellRef::parse("").is_err());
        assert!(CellRef::parse("12").is_err());
        assert!(CellRef::parse("B0").is_err());
        assert!(CellRef::parse("B-1").is_err());
        assert!(CellRef::parse("B2C").is_err());
    }

    #[test]
    fn test_memory_sheet_bounds() {
        let sheet = MemorySheet::from_rows(vec![
            vec![CellValue::Int(1)],
            vec![CellValue::Int(2)],
            vec![CellValue::Int(3)],
        ]);

        assert_eq!(sheet.highest_row(), 3);

        let indices: Vec<u32> = sheet.rows(2, 5).map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 3]);

        assert!(sheet.rows(4, 10).next().is_none());
    }

    #[test]
    fn test_memory_sheet_cell_access() {
        let sheet = MemorySheet::from_rows(vec![vec![
            CellValue::String("a".to_string()),
            CellValue::Int(5),
        ]]);

        assert_eq!(sheet.cell(1, 1), CellValue::Int(5));
        assert_eq!(sheet.cell(1, 9), CellValue::Empty);
        assert_eq!(sheet.cell(9, 0), CellValue::Empty);
    }

    #[test]
    fn test_calamine_range_adapter() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("name".to_string()));
        range.set_value((0, 1), Data::String("qty".to_string()));
        range.set_value((1, 0), Data::String("bolt".to_string()));
        range.set_value((1, 1), Data::Int(12));
        range.set_value((2, 0), Data::String("nut".to_string()));
        range.set_value((2, 1), Data::Float(3.5));

        assert_eq!(Worksheet::highest_row(&range), 3);
        assert_eq!(Worksheet::cell(&range, 2, 1), CellValue::Int(12));

        let rows: Vec<RawRow> = Worksheet::rows(&range, 2, 3).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[1].cells[1], CellValue::Number(3.5));
    }
}
