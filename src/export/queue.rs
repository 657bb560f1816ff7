//! Chain execution: a pre-built export plan run as a strict
//! completion-order sequence on an external executor.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{SheetError, SheetResult};
use crate::export::descriptor::{ExportDescriptor, SheetSource};
use crate::export::disk::{Disk, DiskOptions};
use crate::export::jobs::WorkUnit;
use crate::export::scratch::{ScratchWorkbook, WriterType};

/// A fully-built export: the plan, the scratch artifact it appends to, and
/// the destination the store unit writes. Once dispatched, nothing outside
/// the chain touches the scratch artifact.
pub struct ExportChain {
    pub(crate) export: ExportDescriptor,
    pub(crate) scratch: ScratchWorkbook,
    pub(crate) units: Vec<WorkUnit>,
    pub(crate) writer_type: WriterType,
    pub(crate) disk: Arc<dyn Disk>,
    pub(crate) destination: PathBuf,
    pub(crate) disk_options: DiskOptions,
    /// Rows already requested per query-sourced sheet. Because units run
    /// strictly in plan order, the next page's offset is the sum of the
    /// page sizes executed so far.
    pub(crate) query_offsets: HashMap<usize, u64>,
}

impl ExportChain {
    pub fn units(&self) -> &[WorkUnit] {
        &self.units
    }

    /// Run every unit in plan order, stopping at the first failure. A
    /// failed unit aborts the remainder; the error names the unit.
    pub fn run(mut self) -> SheetResult<()> {
        let units = std::mem::take(&mut self.units);
        for unit in units {
            let label = unit.describe();
            debug!(unit = %label, "executing export unit");
            self.execute(unit).map_err(|e| {
                error!(unit = %label, error = %e, "export chain aborted");
                SheetError::ChainAborted {
                    unit: label,
                    source: Box::new(e),
                }
            })?;
        }
        Ok(())
    }

    fn execute(&mut self, unit: WorkUnit) -> SheetResult<()> {
        match unit {
            WorkUnit::AppendRows { sheet, rows } => {
                self.scratch.append_rows(sheet, &rows)?;
                Ok(())
            }
            WorkUnit::AppendQueryPage {
                sheet,
                page: _,
                page_size,
            } => {
                let offset = self.query_offsets.get(&sheet).copied().unwrap_or(0);
                let rows = match self.sheet_source(sheet)? {
                    SheetSource::Query(query) => query.fetch_rows(offset, page_size)?,
                    _ => {
                        return Err(SheetError::Export(format!(
                            "sheet {sheet} is not query-sourced"
                        )))
                    }
                };
                self.query_offsets.insert(sheet, offset + page_size);
                self.scratch.append_rows(sheet, &rows)?;
                Ok(())
            }
            WorkUnit::AppendView { sheet } => {
                let rows = match self.sheet_source(sheet)? {
                    SheetSource::View(view) => view.render()?,
                    _ => {
                        return Err(SheetError::Export(format!(
                            "sheet {sheet} is not view-sourced"
                        )))
                    }
                };
                self.scratch.append_rows(sheet, &rows)?;
                Ok(())
            }
            WorkUnit::CloseSheet { sheet } => self.scratch.close_sheet(sheet),
            WorkUnit::Store => self.scratch.store(
                self.writer_type,
                self.disk.as_ref(),
                &self.destination,
                &self.disk_options,
            ),
        }
    }

    fn sheet_source(&self, sheet: usize) -> SheetResult<&SheetSource> {
        self.export
            .sheets
            .get(sheet)
            .map(|descriptor| &descriptor.source)
            .ok_or_else(|| SheetError::Export(format!("unknown sheet index {sheet}")))
    }
}

/// Non-blocking handle to a dispatched export chain.
pub struct ExportHandle {
    join: tokio::task::JoinHandle<SheetResult<()>>,
}

impl ExportHandle {
    pub fn new(join: tokio::task::JoinHandle<SheetResult<()>>) -> Self {
        Self { join }
    }

    /// Await the chain's outcome.
    pub async fn wait(self) -> SheetResult<()> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(SheetError::Export(format!("export worker failed: {e}"))),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Abandon the run. The scratch artifact is destroyed with the chain.
    pub fn abort(&self) {
        self.join.abort();
    }
}

/// Executor contract: run a chain sequentially with abort-on-failure
/// semantics, returning without blocking for completion. Retry policy is
/// the executor's concern, never the chain's.
pub trait QueueExecutor: Send + Sync {
    fn dispatch(&self, chain: ExportChain) -> ExportHandle;
}

/// Default executor: the chain runs on a tokio blocking thread. Must be
/// called from within a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioQueue;

impl QueueExecutor for TokioQueue {
    fn dispatch(&self, chain: ExportChain) -> ExportHandle {
        ExportHandle::new(tokio::task::spawn_blocking(move || chain.run()))
    }
}
