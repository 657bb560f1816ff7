//! Row import engine: strictly sequential, pull-based iteration over a
//! bounded worksheet window, with batch-triggered persistence.

use tracing::debug;

use crate::error::{SheetError, SheetResult};
use crate::import::descriptor::ImportDescriptor;
use crate::import::heading;
use crate::import::model_manager::{ModelManager, ModelSink};
use crate::import::row::Row;
use crate::worksheet::Worksheet;

/// Drives a tabular import: projects rows, applies the declared hooks, and
/// flushes the batch accumulator at the declared cadence.
pub struct ModelImporter<S> {
    manager: ModelManager<S>,
}

impl<S: ModelSink> ModelImporter<S> {
    pub fn new(manager: ModelManager<S>) -> Self {
        Self { manager }
    }

    /// Import `sheet` according to `import`, starting at `start_row`
    /// (1-based). A start row past the worksheet's end is an empty success.
    ///
    /// A validation failure or a persistence failure aborts the remaining
    /// iteration and propagates; neither is retried here.
    pub fn import(
        &mut self,
        sheet: &dyn Worksheet,
        import: &mut ImportDescriptor,
        start_row: u32,
    ) -> SheetResult<()> {
        let highest_row = sheet.highest_row();
        if start_row > highest_row {
            return Ok(());
        }

        let heading_row = heading::extract(sheet, import.heading, import.heading_row, import.end_column);
        let start = heading::data_start_row(import.heading, import.heading_row, start_row);
        let end = heading::find_end_row(import.row_limit, highest_row);
        let batch_size = import.batch_size.max(1);
        let bulk = batch_size > 1;

        self.manager
            .set_remembers_row_number(import.remember_row_number);

        debug!(start, end, batch_size, "importing worksheet window");

        let mut since_flush = 0usize;
        for raw in sheet.rows(start, end) {
            let row = Row::new(&raw, &heading_row);
            if import.skip_empty_rows && row.is_empty(import.calculated_formulas) {
                continue;
            }

            let mut record =
                row.to_record(import.calculated_formulas, import.format_data, import.end_column);

            if let Some(prepare) = import.prepare.as_mut() {
                record = prepare(record, raw.index).map_err(|failure| {
                    SheetError::validation(raw.index, failure.field.as_deref(), failure.message)
                })?;
            }

            if let Some(map) = import.map.as_mut() {
                record = map(record);
            }

            self.manager.add(raw.index, record);
            since_flush += 1;

            if since_flush == batch_size {
                self.manager.flush(bulk)?;
                since_flush = 0;
                if let Some(progress) = import.progress.as_mut() {
                    progress.advance(batch_size);
                }
            }
        }

        // Left-overs: a final partial batch flushes unconditionally.
        if !self.manager.is_empty() {
            self.manager.flush(bulk)?;
        }

        Ok(())
    }

    pub fn manager(&self) -> &ModelManager<S> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ModelManager<S> {
        &mut self.manager
    }

    pub fn into_manager(self) -> ModelManager<S> {
        self.manager
    }
}
