//! Work units: the discrete, independently schedulable steps of an export
//! plan. Units carry either their own data (collection chunks) or the
//! parameters needed to fetch it lazily on the executing worker.

use crate::types::CellRow;

/// One step of an export plan. Plan order is execution order; the chain
/// guarantees unit N+1 never starts before unit N succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkUnit {
    /// Append an embedded chunk of rows to a sheet.
    AppendRows { sheet: usize, rows: Vec<CellRow> },
    /// Fetch one 1-based query page on the worker and append it.
    AppendQueryPage {
        sheet: usize,
        page: u64,
        page_size: u64,
    },
    /// Render the sheet's view on the worker and append it whole.
    AppendView { sheet: usize },
    /// Seal a sheet; no later unit may append to it.
    CloseSheet { sheet: usize },
    /// Render the finished scratch artifact and put it on the disk.
    Store,
}

impl WorkUnit {
    /// Short human-readable label used in logs and chain-abort errors.
    pub fn describe(&self) -> String {
        match self {
            WorkUnit::AppendRows { sheet, rows } => {
                format!("append {} rows to sheet {}", rows.len(), sheet)
            }
            WorkUnit::AppendQueryPage {
                sheet,
                page,
                page_size,
            } => format!("append query page {page} (size {page_size}) to sheet {sheet}"),
            WorkUnit::AppendView { sheet } => format!("append view to sheet {sheet}"),
            WorkUnit::CloseSheet { sheet } => format!("close sheet {sheet}"),
            WorkUnit::Store => "store export".to_string(),
        }
    }
}
