//! Import pipeline: heading resolution, row projection, batched model
//! persistence and mapped-cell reads.

mod descriptor;
mod heading;
mod mapped_reader;
mod model_importer;
mod model_manager;
mod row;

pub use descriptor::{ImportDescriptor, MapHook, PrepareHook, Progress};
pub use heading::{HeadingKind, HeadingRow};
pub use mapped_reader::{ArrayHandler, CellMap, CollectionHandler, MappedReader, ModelHandler};
pub use model_importer::ModelImporter;
pub use model_manager::{ModelManager, ModelSink, NullTransactionHandler, TransactionHandler};
pub use row::Row;
