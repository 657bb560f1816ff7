//! Export pipeline: plan building, chained unit execution, scratch staging
//! and storage.

mod descriptor;
mod disk;
mod jobs;
mod queue;
mod queued_writer;
mod scratch;

pub use descriptor::{ExportDescriptor, QuerySource, SheetDescriptor, SheetSource, ViewSource};
pub use disk::{Disk, DiskOptions, LocalDisk};
pub use jobs::WorkUnit;
pub use queue::{ExportChain, ExportHandle, QueueExecutor, TokioQueue};
pub use queued_writer::{ExportConfig, QueuedWriter, DEFAULT_CHUNK_SIZE};
pub use scratch::{ScratchWorkbook, TemporaryFile, WriterType};
