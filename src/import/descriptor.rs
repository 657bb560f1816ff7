//! Declarative import description.
//!
//! Every optional behaviour an import can opt into is an explicit field
//! here, resolved once before iteration: option flags for the cheap
//! switches, boxed closures for the hooks. The engine never re-inspects
//! capabilities per row.

use crate::error::ValidationFailure;
use crate::import::heading::HeadingKind;
use crate::types::Record;

/// Validation-preparation hook: may normalize the record or reject the row.
pub type PrepareHook = Box<dyn FnMut(Record, u32) -> Result<Record, ValidationFailure> + Send>;

/// Field-mapping hook applied after validation preparation.
pub type MapHook = Box<dyn FnMut(Record) -> Record + Send>;

/// Console-style progress reporting, advanced once per flushed batch.
pub trait Progress {
    fn advance(&mut self, n: usize);
}

/// Describes one tabular import: heading convention, batching, filtering,
/// read preferences and hooks.
#[derive(Default)]
pub struct ImportDescriptor {
    pub(crate) heading: HeadingKind,
    pub(crate) heading_row: u32,
    pub(crate) batch_size: usize,
    pub(crate) skip_empty_rows: bool,
    pub(crate) calculated_formulas: bool,
    pub(crate) format_data: bool,
    pub(crate) row_limit: Option<u32>,
    pub(crate) end_column: Option<u16>,
    pub(crate) remember_row_number: bool,
    pub(crate) prepare: Option<PrepareHook>,
    pub(crate) map: Option<MapHook>,
    pub(crate) progress: Option<Box<dyn Progress + Send>>,
}

impl ImportDescriptor {
    pub fn new() -> Self {
        Self {
            heading: HeadingKind::None,
            heading_row: 1,
            batch_size: 1,
            ..Default::default()
        }
    }

    /// Declare a single heading row (1-based; row 1 by default).
    pub fn with_heading_row(mut self, row: u32) -> Self {
        self.heading = HeadingKind::Flat;
        self.heading_row = row.max(1);
        self
    }

    /// Declare a two-row grouped heading starting at `row` (categories
    /// there, field names on the row below).
    pub fn with_grouped_heading(mut self, row: u32) -> Self {
        self.heading = HeadingKind::Grouped;
        self.heading_row = row.max(1);
        self
    }

    /// Opt into batched inserts. A size of 1 keeps per-row flushing.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Skip rows whose projected values are all empty.
    pub fn skipping_empty_rows(mut self) -> Self {
        self.skip_empty_rows = true;
        self
    }

    /// Prefer cached formula results over formula text.
    pub fn with_calculated_formulas(mut self) -> Self {
        self.calculated_formulas = true;
        self
    }

    /// Render resolved values as display strings.
    pub fn with_format_data(mut self) -> Self {
        self.format_data = true;
        self
    }

    /// Stop reading at this 1-based row (clamped to the worksheet's end).
    pub fn with_row_limit(mut self, row: u32) -> Self {
        self.row_limit = Some(row);
        self
    }

    /// Ignore cells beyond this 0-based column.
    pub fn with_end_column(mut self, col: u16) -> Self {
        self.end_column = Some(col);
        self
    }

    /// Hand originating sheet row numbers through to the persistence sink.
    pub fn remembering_row_numbers(mut self) -> Self {
        self.remember_row_number = true;
        self
    }

    pub fn preparing_with(
        mut self,
        hook: impl FnMut(Record, u32) -> Result<Record, ValidationFailure> + Send + 'static,
    ) -> Self {
        self.prepare = Some(Box::new(hook));
        self
    }

    pub fn mapping_with(mut self, hook: impl FnMut(Record) -> Record + Send + 'static) -> Self {
        self.map = Some(Box::new(hook));
        self
    }

    pub fn with_progress(mut self, progress: impl Progress + Send + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }
}
