//! Mapped-cell reads for non-tabular imports: a fixed coordinate-to-field
//! mapping resolved into a single flat record.

use crate::error::SheetResult;
use crate::types::Record;
use crate::worksheet::{CellRef, Worksheet};

/// Model-construction handler: builds a domain object from the record and
/// persists it, raising on persistence failure.
pub type ModelHandler = Box<dyn FnMut(Record) -> SheetResult<()> + Send>;

/// Collection-delivery handler: receives a single-element container.
pub type CollectionHandler = Box<dyn FnMut(Vec<Record>) + Send>;

/// Array-delivery handler: receives the raw record.
pub type ArrayHandler = Box<dyn FnMut(Record) + Send>;

/// Describes a mapped-cell import: named cell coordinates, read preferences
/// and up to three output handlers.
#[derive(Default)]
pub struct CellMap {
    mapping: Vec<(String, CellRef)>,
    calculated_formulas: bool,
    format_data: bool,
    to_model: Option<ModelHandler>,
    to_collection: Option<CollectionHandler>,
    to_array: Option<ArrayHandler>,
}

impl CellMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to the cell at `at`.
    pub fn field(mut self, name: impl Into<String>, at: CellRef) -> Self {
        self.mapping.push((name.into(), at));
        self
    }

    pub fn with_calculated_formulas(mut self) -> Self {
        self.calculated_formulas = true;
        self
    }

    pub fn with_format_data(mut self) -> Self {
        self.format_data = true;
        self
    }

    pub fn to_model(mut self, handler: impl FnMut(Record) -> SheetResult<()> + Send + 'static) -> Self {
        self.to_model = Some(Box::new(handler));
        self
    }

    pub fn to_collection(mut self, handler: impl FnMut(Vec<Record>) + Send + 'static) -> Self {
        self.to_collection = Some(Box::new(handler));
        self
    }

    pub fn to_array(mut self, handler: impl FnMut(Record) + Send + 'static) -> Self {
        self.to_array = Some(Box::new(handler));
        self
    }
}

pub struct MappedReader;

impl MappedReader {
    /// Resolve the declared mapping against `sheet` into one flat record and
    /// dispatch it to exactly one output handler.
    ///
    /// Handler precedence is model > collection > array: when several are
    /// set, only the highest-priority one fires. The precedence is
    /// deliberate, not first-come-first-served.
    pub fn map(import: &mut CellMap, sheet: &dyn Worksheet) -> SheetResult<()> {
        let mut record = Record::new();
        for (name, at) in &import.mapping {
            record.insert(
                name.clone(),
                sheet
                    .cell(at.row, at.col)
                    .resolve(import.calculated_formulas, import.format_data),
            );
        }

        if let Some(handler) = import.to_model.as_mut() {
            return handler(record);
        }
        if let Some(handler) = import.to_collection.as_mut() {
            handler(vec![record]);
            return Ok(());
        }
        if let Some(handler) = import.to_array.as_mut() {
            handler(record);
        }
        Ok(())
    }
}
