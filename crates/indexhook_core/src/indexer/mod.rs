//! Indexing collaborator: persisting processed records.
//!
//! - [`IndexWriter`]: where processed records go (the external index engine)
//! - [`IndexingPipeline`]: runs the stage, then hands the record to a writer
//! - [`MemoryIndex`]: in-memory token index implementing [`IndexWriter`]

mod memory;
mod pipeline;

pub use memory::{MemoryIndex, TokenizerConfig};
pub use pipeline::{BatchOutcome, IndexingPipeline};

use crate::error::CoreResult;
use crate::record::IndexRecord;
use crate::types::IndexName;

/// Persists records into a search index.
///
/// Implementations must be `Send + Sync`; indexing may run on several
/// worker threads at once.
pub trait IndexWriter: Send + Sync {
    /// Writes (or overwrites) a record.
    fn write(&self, index: &IndexName, record: &IndexRecord) -> CoreResult<()>;

    /// Deletes a record. Returns whether it existed.
    fn delete(&self, index: &IndexName, id: &str) -> CoreResult<bool>;
}

impl<W: IndexWriter + ?Sized> IndexWriter for std::sync::Arc<W> {
    fn write(&self, index: &IndexName, record: &IndexRecord) -> CoreResult<()> {
        (**self).write(index, record)
    }

    fn delete(&self, index: &IndexName, id: &str) -> CoreResult<bool> {
        (**self).delete(index, id)
    }
}
