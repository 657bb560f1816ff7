//! Sheetflow - queueable spreadsheet import/export pipeline
//!
//! This library streams large spreadsheet datasets into application domain
//! objects and streams domain data back out to spreadsheet files, without
//! holding an entire workbook in memory.
//!
//! # Features
//!
//! - Row-by-row import with heading resolution, empty-row skipping,
//!   validation/mapping hooks and batched persistence
//! - Mapped-cell reads for non-tabular sheets
//! - Export plans split into bounded work units (collection chunks, query
//!   pages, rendered views) chained for deterministic output ordering
//! - Worksheet, persistence, queue and storage seams as narrow traits with
//!   calamine / tokio / local-disk adapters included
//!
//! # Example
//!
//! ```no_run
//! use sheetflow::import::{ImportDescriptor, ModelImporter, ModelManager, ModelSink};
//! use sheetflow::{MemorySheet, Record, SheetResult};
//!
//! struct Contacts(Vec<Record>);
//!
//! impl ModelSink for Contacts {
//!     fn save(&mut self, record: Record, _row: Option<u32>) -> SheetResult<()> {
//!         self.0.push(record);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> SheetResult<()> {
//! let sheet = MemorySheet::new(); // usually a calamine worksheet range
//!
//! let mut import = ImportDescriptor::new()
//!     .with_heading_row(1)
//!     .with_batch_size(100)
//!     .skipping_empty_rows();
//!
//! let mut importer = ModelImporter::new(ModelManager::new(Contacts(Vec::new())));
//! importer.import(&sheet, &mut import, 1)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod export;
pub mod import;
pub mod types;
pub mod worksheet;

// Re-export commonly used types
pub use error::{SheetError, SheetResult, ValidationFailure};
pub use types::{CellRow, CellValue, Record};
pub use worksheet::{CellRef, MemorySheet, RawRow, Worksheet};
