//! Export job partitioner: turns an export description into an ordered,
//! sequentially-dependent chain of bounded-size work units and hands the
//! chain to a queue executor.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::error::SheetResult;
use crate::export::descriptor::{ExportDescriptor, SheetSource};
use crate::export::disk::{Disk, DiskOptions};
use crate::export::jobs::WorkUnit;
use crate::export::queue::{ExportChain, ExportHandle, QueueExecutor, TokioQueue};
use crate::export::scratch::{ScratchWorkbook, TemporaryFile, WriterType};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Export orchestration settings.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Rows per append-unit when a sheet declares no custom chunk size.
    pub chunk_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Builds export plans and dispatches them. The `store` call never blocks
/// on the export itself; completion is observed through the returned handle.
pub struct QueuedWriter<Q = TokioQueue> {
    queue: Q,
    config: ExportConfig,
}

impl QueuedWriter<TokioQueue> {
    pub fn new() -> Self {
        Self::with_queue(TokioQueue, ExportConfig::default())
    }
}

impl Default for QueuedWriter<TokioQueue> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: QueueExecutor> QueuedWriter<Q> {
    pub fn with_queue(queue: Q, config: ExportConfig) -> Self {
        Self { queue, config }
    }

    /// Partition `export` into a chain of work units and dispatch it.
    ///
    /// `writer_type` falls back to the destination's extension. The scratch
    /// artifact is allocated here and owned by the chain until the store
    /// unit finishes (or the run is abandoned).
    pub fn store(
        &self,
        export: ExportDescriptor,
        destination: impl Into<PathBuf>,
        disk: Arc<dyn Disk>,
        writer_type: Option<WriterType>,
        disk_options: DiskOptions,
    ) -> SheetResult<ExportHandle> {
        let destination = destination.into();
        let writer_type = writer_type.unwrap_or_else(|| WriterType::from_path(&destination));
        let scratch = ScratchWorkbook::new(TemporaryFile::new()?, export.sheets())?;
        let units = self.build_plan(&export)?;

        info!(
            units = units.len(),
            destination = %destination.display(),
            "dispatching export chain"
        );

        Ok(self.queue.dispatch(ExportChain {
            export,
            scratch,
            units,
            writer_type,
            disk,
            destination,
            disk_options,
            query_offsets: Default::default(),
        }))
    }

    /// Build the ordered plan: per sheet, its append-units then one
    /// close-unit; one final store-unit for the whole export.
    pub fn build_plan(&self, export: &ExportDescriptor) -> SheetResult<Vec<WorkUnit>> {
        let mut units = Vec::new();

        for (sheet, descriptor) in export.sheets().iter().enumerate() {
            let chunk_size = descriptor.chunk_size.unwrap_or(self.config.chunk_size).max(1);

            match &descriptor.source {
                SheetSource::Collection(rows) => {
                    // Each chunk unit embeds its own rows; it needs nothing
                    // from the source once dispatched.
                    for slice in rows.chunks(chunk_size) {
                        units.push(WorkUnit::AppendRows {
                            sheet,
                            rows: slice.to_vec(),
                        });
                    }
                }
                SheetSource::Query(query) => {
                    let count = match descriptor.query_size {
                        Some(declared) => declared,
                        None => query.count()?,
                    };
                    let chunk = chunk_size as u64;
                    let spins = count.div_ceil(chunk);
                    for page in 1..=spins {
                        let page_size = if page == spins {
                            count - (spins - 1) * chunk
                        } else {
                            chunk
                        };
                        units.push(WorkUnit::AppendQueryPage {
                            sheet,
                            page,
                            page_size,
                        });
                    }
                }
                SheetSource::View(_) => {
                    units.push(WorkUnit::AppendView { sheet });
                }
            }

            units.push(WorkUnit::CloseSheet { sheet });
        }

        units.push(WorkUnit::Store);
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::descriptor::{QuerySource, SheetDescriptor, ViewSource};
    use crate::types::{CellRow, CellValue};

    struct StubQuery {
        count: u64,
    }

    impl QuerySource for StubQuery {
        fn count(&self) -> SheetResult<u64> {
            Ok(self.count)
        }

        fn fetch_rows(&self, _offset: u64, _limit: u64) -> SheetResult<Vec<CellRow>> {
            Ok(vec![])
        }
    }

    struct StubView;

    impl ViewSource for StubView {
        fn render(&self) -> SheetResult<Vec<CellRow>> {
            Ok(vec![])
        }
    }

    fn collection_rows(n: usize) -> Vec<CellRow> {
        (0..n).map(|i| vec![CellValue::Int(i as i64)]).collect()
    }

    #[test]
    fn test_collection_plan_chunks_and_terminates() {
        let writer = QueuedWriter::new();
        let export = ExportDescriptor::single(
            SheetDescriptor::from_collection(collection_rows(10)).with_chunk_size(4),
        );

        let plan = writer.build_plan(&export).unwrap();

        let sizes: Vec<usize> = plan
            .iter()
            .filter_map(|unit| match unit {
                WorkUnit::AppendRows { rows, .. } => Some(rows.len()),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(plan[3], WorkUnit::CloseSheet { sheet: 0 });
        assert_eq!(plan[4], WorkUnit::Store);
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn test_query_plan_pages_with_remainder() {
        let writer = QueuedWriter::new();
        let export = ExportDescriptor::single(
            SheetDescriptor::from_query(StubQuery { count: 2500 }),
        );

        let plan = writer.build_plan(&export).unwrap();

        let pages: Vec<(u64, u64)> = plan
            .iter()
            .filter_map(|unit| match unit {
                WorkUnit::AppendQueryPage {
                    page, page_size, ..
                } => Some((*page, *page_size)),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![(1, 1000), (2, 1000), (3, 500)]);
    }

    #[test]
    fn test_declared_query_size_skips_count_query() {
        struct PanicQuery;
        impl QuerySource for PanicQuery {
            fn count(&self) -> SheetResult<u64> {
                panic!("count query must not run when a size is declared");
            }
            fn fetch_rows(&self, _: u64, _: u64) -> SheetResult<Vec<CellRow>> {
                Ok(vec![])
            }
        }

        let writer = QueuedWriter::new();
        let export = ExportDescriptor::single(
            SheetDescriptor::from_query(PanicQuery)
                .with_query_size(1500)
                .with_chunk_size(1000),
        );

        let plan = writer.build_plan(&export).unwrap();
        let pages: Vec<u64> = plan
            .iter()
            .filter_map(|unit| match unit {
                WorkUnit::AppendQueryPage { page, .. } => Some(*page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn test_view_plan_is_a_single_unit() {
        let writer = QueuedWriter::new();
        let export = ExportDescriptor::single(SheetDescriptor::from_view(StubView));

        let plan = writer.build_plan(&export).unwrap();
        assert_eq!(
            plan,
            vec![
                WorkUnit::AppendView { sheet: 0 },
                WorkUnit::CloseSheet { sheet: 0 },
                WorkUnit::Store,
            ]
        );
    }

    #[test]
    fn test_multi_sheet_plan_order() {
        let writer = QueuedWriter::new();
        let export = ExportDescriptor::with_sheets(vec![
            SheetDescriptor::from_collection(collection_rows(3)).with_chunk_size(2),
            SheetDescriptor::from_view(StubView),
        ]);

        let plan = writer.build_plan(&export).unwrap();
        assert_eq!(
            plan,
            vec![
                WorkUnit::AppendRows {
                    sheet: 0,
                    rows: collection_rows(3)[..2].to_vec(),
                },
                WorkUnit::AppendRows {
                    sheet: 0,
                    rows: collection_rows(3)[2..].to_vec(),
                },
                WorkUnit::CloseSheet { sheet: 0 },
                WorkUnit::AppendView { sheet: 1 },
                WorkUnit::CloseSheet { sheet: 1 },
                WorkUnit::Store,
            ]
        );
    }

    #[test]
    fn test_empty_collection_still_closes_and_stores() {
        let writer = QueuedWriter::new();
        let export = ExportDescriptor::single(SheetDescriptor::from_collection(vec![]));

        let plan = writer.build_plan(&export).unwrap();
        assert_eq!(
            plan,
            vec![WorkUnit::CloseSheet { sheet: 0 }, WorkUnit::Store]
        );
    }

    #[test]
    fn test_zero_count_query_emits_no_pages() {
        let writer = QueuedWriter::new();
        let export =
            ExportDescriptor::single(SheetDescriptor::from_query(StubQuery { count: 0 }));

        let plan = writer.build_plan(&export).unwrap();
        assert_eq!(
            plan,
            vec![WorkUnit::CloseSheet { sheet: 0 }, WorkUnit::Store]
        );
    }
}
