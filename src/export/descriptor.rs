//! Declarative export description: one or more sheets, each backed by a
//! collection, a paged query, or a rendered view.

use crate::error::SheetResult;
use crate::types::CellRow;

/// Lazily-paged data source. The plan's pages are 1-based and contiguous;
/// the executing chain turns them into offset/limit fetches, so workers pull
/// data at execution time, never at plan-build time.
pub trait QuerySource: Send {
    /// Total row count, used when the sheet declares no custom size.
    fn count(&self) -> SheetResult<u64>;

    /// Fetch up to `limit` rows starting at the 0-based `offset`.
    fn fetch_rows(&self, offset: u64, limit: u64) -> SheetResult<Vec<CellRow>>;
}

/// Source rendered in one piece; views are never chunked.
pub trait ViewSource: Send {
    fn render(&self) -> SheetResult<Vec<CellRow>>;
}

/// Where a sheet's rows come from.
pub enum SheetSource {
    /// In-memory rows, embedded chunk by chunk into the plan.
    Collection(Vec<CellRow>),
    Query(Box<dyn QuerySource>),
    View(Box<dyn ViewSource>),
}

impl std::fmt::Debug for SheetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSource::Collection(rows) => {
                f.debug_tuple("Collection").field(&rows.len()).finish()
            }
            SheetSource::Query(_) => f.write_str("Query"),
            SheetSource::View(_) => f.write_str("View"),
        }
    }
}

/// One sheet of an export.
#[derive(Debug)]
pub struct SheetDescriptor {
    pub(crate) name: Option<String>,
    pub(crate) headings: Option<Vec<String>>,
    pub(crate) source: SheetSource,
    pub(crate) chunk_size: Option<usize>,
    pub(crate) query_size: Option<u64>,
}

impl SheetDescriptor {
    fn from_source(source: SheetSource) -> Self {
        Self {
            name: None,
            headings: None,
            source,
            chunk_size: None,
            query_size: None,
        }
    }

    pub fn from_collection(rows: Vec<CellRow>) -> Self {
        Self::from_source(SheetSource::Collection(rows))
    }

    pub fn from_query(query: impl QuerySource + 'static) -> Self {
        Self::from_source(SheetSource::Query(Box::new(query)))
    }

    pub fn from_view(view: impl ViewSource + 'static) -> Self {
        Self::from_source(SheetSource::View(Box::new(view)))
    }

    /// Worksheet title in the stored workbook.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Heading row written once, before the sheet's first data chunk.
    pub fn with_headings(mut self, headings: Vec<String>) -> Self {
        self.headings = Some(headings);
        self
    }

    /// Chunk size for this sheet, overriding the configured default.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size.max(1));
        self
    }

    /// Declared query size, replacing the execution-time count query.
    pub fn with_query_size(mut self, size: u64) -> Self {
        self.query_size = Some(size);
        self
    }
}

/// A whole export: its ordered sheets.
#[derive(Debug)]
pub struct ExportDescriptor {
    pub(crate) sheets: Vec<SheetDescriptor>,
}

impl ExportDescriptor {
    /// A single-sheet export.
    pub fn single(sheet: SheetDescriptor) -> Self {
        Self {
            sheets: vec![sheet],
        }
    }

    /// A multi-sheet export; sheet order is preserved in the output.
    pub fn with_sheets(sheets: Vec<SheetDescriptor>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[SheetDescriptor] {
        &self.sheets
    }
}
