use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

//==============================================================================
// Cell values
//==============================================================================

/// Raw scalar content of a single worksheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    String(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Formula expression together with the cached result of its last
    /// evaluation, when the producing codec supplies one. This crate never
    /// evaluates formulas itself.
    Formula {
        expr: String,
        cached: Option<Box<CellValue>>,
    },
    /// Cell-level error marker (e.g. `#DIV/0!`).
    Error(String),
}

impl CellValue {
    /// Whether the value carries no content. Formula cells are judged by
    /// [`CellValue::resolve`], not here.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Resolve the value under the declared read preferences.
    ///
    /// With `calculated` set, a formula yields its cached result (or empty
    /// when the codec supplied none); otherwise it yields the formula text.
    /// With `formatted` set, the resolved value is rendered as its display
    /// string.
    pub fn resolve(&self, calculated: bool, formatted: bool) -> CellValue {
        let value = match self {
            CellValue::Formula { expr, cached } => {
                if calculated {
                    cached
                        .as_deref()
                        .cloned()
                        .unwrap_or(CellValue::Empty)
                } else {
                    CellValue::String(expr.clone())
                }
            }
            other => other.clone(),
        };

        if formatted {
            value.as_display()
        } else {
            value
        }
    }

    fn as_display(&self) -> CellValue {
        match self {
            CellValue::Empty => CellValue::Empty,
            other => CellValue::String(other.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Formula { expr, .. } => write!(f, "{expr}"),
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}

/// One ordered row of raw cells, as produced by export data sources.
pub type CellRow = Vec<CellValue>;

//==============================================================================
// Projected records
//==============================================================================

/// A single worksheet row projected into named fields.
///
/// Field order follows column order. Inserting a duplicate key overwrites the
/// earlier value (last occurrence wins); grouped headings that collapse to the
/// same composite key follow the same policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether every field value is empty. A record with no fields is blank.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.fields.into_iter().map(|(_, v)| v).collect()
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, CellValue)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_emptiness() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::String(String::new()).is_empty());
        assert!(!CellValue::String("x".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::Bool(false).is_empty());
    }

    #[test]
    fn test_formula_resolution_prefers_cached_value() {
        let cell = CellValue::Formula {
            expr: "=A1+B1".to_string(),
            cached: Some(Box::new(CellValue::Number(42.0))),
        };

        assert_eq!(cell.resolve(true, false), CellValue::Number(42.0));
        assert_eq!(
            cell.resolve(false, false),
            CellValue::String("=A1+B1".to_string())
        );
    }

    #[test]
    fn test_formula_without_cached_value_resolves_empty() {
        let cell = CellValue::Formula {
            expr: "=SUM(A:A)".to_string(),
            cached: None,
        };
        assert_eq!(cell.resolve(true, false), CellValue::Empty);
    }

    #[test]
    fn test_formatted_resolution_renders_display_strings() {
        assert_eq!(
            CellValue::Number(1.5).resolve(false, true),
            CellValue::String("1.5".to_string())
        );
        assert_eq!(CellValue::Empty.resolve(false, true), CellValue::Empty);
    }

    #[test]
    fn test_record_insert_overwrites_duplicates() {
        let mut record = Record::new();
        record.insert("a", CellValue::Int(1));
        record.insert("b", CellValue::Int(2));
        record.insert("a", CellValue::Int(3));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&CellValue::Int(3)));
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_record_blankness() {
        let mut record = Record::new();
        assert!(record.is_blank());

        record.insert("a", CellValue::Empty);
        record.insert("b", CellValue::String(String::new()));
        assert!(record.is_blank());

        record.insert("c", CellValue::Number(0.0));
        assert!(!record.is_blank());
    }
}
