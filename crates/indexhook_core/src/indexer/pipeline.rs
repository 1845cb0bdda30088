//! Transform-then-persist pipeline.

use super::IndexWriter;
use crate::error::{CoreError, CoreResult};
use crate::record::IndexRecord;
use crate::stage::TransformStage;
use crate::types::IndexName;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of [`IndexingPipeline::index_batch`].
#[derive(Debug)]
pub struct BatchOutcome {
    /// Records written before the batch stopped.
    pub persisted: usize,
    /// The error that stopped the batch, if any.
    pub error: Option<CoreError>,
}

impl BatchOutcome {
    /// Returns true if every record was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs records through a [`TransformStage`] and writes the results.
///
/// A record whose processing fails is never handed to the writer.
pub struct IndexingPipeline<W> {
    stage: Arc<TransformStage>,
    writer: W,
}

impl<W: IndexWriter> IndexingPipeline<W> {
    /// Creates a pipeline.
    pub fn new(stage: Arc<TransformStage>, writer: W) -> Self {
        Self { stage, writer }
    }

    /// Returns the stage.
    pub fn stage(&self) -> &Arc<TransformStage> {
        &self.stage
    }

    /// Returns the writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Processes one record and writes it.
    ///
    /// Returns the record as persisted.
    ///
    /// # Errors
    ///
    /// Returns the stage's error without writing, or the writer's error.
    pub fn index_record(&self, index: &str, record: IndexRecord) -> CoreResult<IndexRecord> {
        let record = self.stage.process(index, record)?;
        self.writer.write(&IndexName::new(index), &record)?;
        debug!(index, record_id = record.id(), fields = record.fields().len(), "indexed record");
        Ok(record)
    }

    /// Indexes records in order, stopping at the first failure.
    pub fn index_batch<I>(&self, index: &str, records: I) -> BatchOutcome
    where
        I: IntoIterator<Item = IndexRecord>,
    {
        let mut persisted = 0;
        for record in records {
            let id = record.id().to_string();
            if let Err(error) = self.index_record(index, record) {
                warn!(index, record_id = %id, %error, persisted, "batch stopped");
                return BatchOutcome {
                    persisted,
                    error: Some(error),
                };
            }
            persisted += 1;
        }
        BatchOutcome {
            persisted,
            error: None,
        }
    }

    /// Removes a record from the index.
    pub fn remove(&self, index: &str, id: &str) -> CoreResult<bool> {
        self.writer.delete(&IndexName::new(index), id)
    }
}
