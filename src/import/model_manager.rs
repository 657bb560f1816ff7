//! Batch accumulator: buffers projected records and flushes them to the
//! domain persistence sink as single or bulk operations.

use crate::error::{SheetError, SheetResult};
use crate::types::Record;

/// Domain-side persistence consumed by the batch accumulator. Implementors
/// construct their domain object from the record and persist it.
pub trait ModelSink {
    /// Persist one record. `row` carries the originating sheet row number
    /// when the import asked for it.
    fn save(&mut self, record: Record, row: Option<u32>) -> SheetResult<()>;

    /// Persist a batch in one bulk operation. The default falls back to
    /// per-record saves.
    fn save_bulk(&mut self, records: Vec<(Option<u32>, Record)>) -> SheetResult<()> {
        for (row, record) in records {
            self.save(record, row)?;
        }
        Ok(())
    }
}

/// Wraps a flush in a transactional scope.
pub trait TransactionHandler: Send {
    fn transaction(&self, work: &mut dyn FnMut() -> SheetResult<()>) -> SheetResult<()>;
}

/// Default handler: no transactional scope, the work just runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransactionHandler;

impl TransactionHandler for NullTransactionHandler {
    fn transaction(&self, work: &mut dyn FnMut() -> SheetResult<()>) -> SheetResult<()> {
        work()
    }
}

/// Buffers records in row encounter order until flushed.
pub struct ModelManager<S> {
    sink: S,
    transactions: Box<dyn TransactionHandler>,
    buffer: Vec<(u32, Record)>,
    remembers_row_number: bool,
}

impl<S: ModelSink> ModelManager<S> {
    pub fn new(sink: S) -> Self {
        Self::with_transactions(sink, Box::new(NullTransactionHandler))
    }

    pub fn with_transactions(sink: S, transactions: Box<dyn TransactionHandler>) -> Self {
        Self {
            sink,
            transactions,
            buffer: Vec::new(),
            remembers_row_number: false,
        }
    }

    pub fn set_remembers_row_number(&mut self, remember: bool) {
        self.remembers_row_number = remember;
    }

    pub fn remembers_row_number(&self) -> bool {
        self.remembers_row_number
    }

    /// Buffer a projected record keyed by its sheet row index.
    pub fn add(&mut self, row: u32, record: Record) {
        self.buffer.push((row, record));
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Flush the buffered records inside the transaction handler's scope.
    /// `bulk` selects the sink's bulk path; an empty buffer is a no-op.
    pub fn flush(&mut self, bulk: bool) -> SheetResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let drained = std::mem::take(&mut self.buffer);
        let remembers = self.remembers_row_number;
        let sink = &mut self.sink;
        let mut pending = Some(drained);

        self.transactions.transaction(&mut || {
            let records = pending
                .take()
                .ok_or_else(|| SheetError::Persistence("flush ran twice".to_string()))?;
            if bulk {
                sink.save_bulk(
                    records
                        .into_iter()
                        .map(|(row, record)| (remembers.then_some(row), record))
                        .collect(),
                )
            } else {
                for (row, record) in records {
                    sink.save(record, remembers.then_some(row))?;
                }
                Ok(())
            }
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    #[derive(Default)]
    struct RecordingSink {
        saved: Vec<(Option<u32>, Record)>,
        bulk_calls: usize,
        single_calls: usize,
    }

    impl ModelSink for RecordingSink {
        fn save(&mut self, record: Record, row: Option<u32>) -> SheetResult<()> {
            self.single_calls += 1;
            self.saved.push((row, record));
            Ok(())
        }

        fn save_bulk(&mut self, records: Vec<(Option<u32>, Record)>) -> SheetResult<()> {
            self.bulk_calls += 1;
            self.saved.extend(records);
            Ok(())
        }
    }

    fn record(value: i64) -> Record {
        let mut r = Record::new();
        r.insert("v", CellValue::Int(value));
        r
    }

    #[test]
    fn test_flush_empty_buffer_is_noop() {
        let mut manager = ModelManager::new(RecordingSink::default());
        manager.flush(false).unwrap();
        assert_eq!(manager.sink().single_calls, 0);
        assert_eq!(manager.sink().bulk_calls, 0);
    }

    #[test]
    fn test_single_flush_preserves_order() {
        let mut manager = ModelManager::new(RecordingSink::default());
        manager.add(2, record(20));
        manager.add(3, record(30));
        manager.flush(false).unwrap();

        let sink = manager.sink();
        assert_eq!(sink.single_calls, 2);
        assert_eq!(sink.saved[0].1.get("v"), Some(&CellValue::Int(20)));
        assert_eq!(sink.saved[1].1.get("v"), Some(&CellValue::Int(30)));
    }

    #[test]
    fn test_bulk_flush_uses_bulk_path() {
        let mut manager = ModelManager::new(RecordingSink::default());
        manager.add(1, record(1));
        manager.add(2, record(2));
        manager.flush(true).unwrap();

        assert_eq!(manager.sink().bulk_calls, 1);
        assert_eq!(manager.sink().single_calls, 0);
    }

    #[test]
    fn test_row_numbers_withheld_unless_remembered() {
        let mut manager = ModelManager::new(RecordingSink::default());
        manager.add(5, record(1));
        manager.flush(false).unwrap();
        assert_eq!(manager.sink().saved[0].0, None);

        manager.set_remembers_row_number(true);
        manager.add(6, record(2));
        manager.flush(false).unwrap();
        assert_eq!(manager.sink().saved[1].0, Some(6));
    }

    #[test]
    fn test_flush_runs_inside_transaction_handler() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct CountingHandler(Arc<AtomicUsize>);
        impl TransactionHandler for CountingHandler {
            fn transaction(
                &self,
                work: &mut dyn FnMut() -> SheetResult<()>,
            ) -> SheetResult<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                work()
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let mut manager = ModelManager::with_transactions(
            RecordingSink::default(),
            Box::new(CountingHandler(count.clone())),
        );
        manager.add(1, record(1));
        manager.flush(false).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
