//! Row projection: one raw worksheet row plus a heading definition into a
//! named-field record.

use crate::import::heading::HeadingRow;
use crate::types::{CellValue, Record};
use crate::worksheet::RawRow;

/// A raw row paired with the worksheet's heading, ready for projection.
///
/// Projection is pure: it looks only at this row and the shared heading,
/// never at neighbouring rows.
#[derive(Debug)]
pub struct Row<'a> {
    raw: &'a RawRow,
    heading: &'a HeadingRow,
}

impl<'a> Row<'a> {
    pub fn new(raw: &'a RawRow, heading: &'a HeadingRow) -> Self {
        Self { raw, heading }
    }

    /// 1-based sheet row number.
    pub fn index(&self) -> u32 {
        self.raw.index
    }

    /// Whether every cell resolves to an empty value under the declared
    /// formula preference.
    pub fn is_empty(&self, calculated_formulas: bool) -> bool {
        self.raw
            .cells
            .iter()
            .all(|cell| cell.resolve(calculated_formulas, false).is_empty())
    }

    /// Project into a record. Field names come from the heading (positional
    /// when none is declared); cells beyond `end_column` are dropped; heading
    /// keys with no matching cell are filled with empty values.
    pub fn to_record(
        &self,
        calculated_formulas: bool,
        format_data: bool,
        end_column: Option<u16>,
    ) -> Record {
        let mut width = self.raw.cells.len();
        if let Some(end) = end_column {
            width = width.min(end as usize + 1);
        }
        let columns = if self.heading.is_empty() {
            width
        } else {
            width.max(self.heading.len())
        };

        let mut record = Record::new();
        for col in 0..columns {
            let value = self
                .raw
                .cells
                .get(col)
                .filter(|_| col < width)
                .map(|cell| cell.resolve(calculated_formulas, format_data))
                .unwrap_or(CellValue::Empty);
            record.insert(self.heading.field_name(col), value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::heading::HeadingRow;

    fn raw(index: u32, cells: Vec<CellValue>) -> RawRow {
        RawRow { index, cells }
    }

    #[test]
    fn test_projection_with_heading() {
        let heading = HeadingRow::from_keys(vec!["name".to_string(), "qty".to_string()]);
        let raw = raw(
            4,
            vec![CellValue::String("bolt".to_string()), CellValue::Int(12)],
        );
        let row = Row::new(&raw, &heading);

        let record = row.to_record(false, false, None);
        assert_eq!(row.index(), 4);
        assert_eq!(
            record.get("name"),
            Some(&CellValue::String("bolt".to_string()))
        );
        assert_eq!(record.get("qty"), Some(&CellValue::Int(12)));
    }

    #[test]
    fn test_projection_without_heading_is_positional() {
        let heading = HeadingRow::empty();
        let raw = raw(1, vec![CellValue::Int(1), CellValue::Int(2)]);
        let record = Row::new(&raw, &heading).to_record(false, false, None);

        assert_eq!(record.get("0"), Some(&CellValue::Int(1)));
        assert_eq!(record.get("1"), Some(&CellValue::Int(2)));
    }

    #[test]
    fn test_projection_pads_missing_cells() {
        let heading = HeadingRow::from_keys(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        let raw = raw(2, vec![CellValue::Int(1)]);
        let record = Row::new(&raw, &heading).to_record(false, false, None);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("c"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_projection_truncates_at_column_limit() {
        let heading = HeadingRow::empty();
        let raw = raw(
            1,
            vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)],
        );
        let record = Row::new(&raw, &heading).to_record(false, false, Some(1));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("2"), None);
    }

    #[test]
    fn test_emptiness_respects_formula_preference() {
        let heading = HeadingRow::empty();
        let raw = raw(
            1,
            vec![CellValue::Formula {
                expr: "=A1".to_string(),
                cached: Some(Box::new(CellValue::Empty)),
            }],
        );
        let row = Row::new(&raw, &heading);

        // Calculated: the cached (empty) value decides. Otherwise the
        // formula text counts as content.
        assert!(row.is_empty(true));
        assert!(!row.is_empty(false));
    }
}
