//! Error types for the transform stage.

use crate::types::IndexName;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Boxed error raised by a transform or an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while transforming or indexing records.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A registered transform failed while processing a record.
    ///
    /// Under the default fail-closed policy this aborts the index write.
    #[error("transform '{transform}' failed on record {record_id} in index {index}: {source}")]
    CallbackFailure {
        /// The index the record was destined for.
        index: IndexName,
        /// Name of the failing transform.
        transform: String,
        /// Identifier of the record being processed.
        record_id: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// An ancestry lookup ran without a live consistency scope.
    #[error("no consistency scope available: {reason}")]
    MissingScope {
        /// Why the scope could not be used.
        reason: String,
    },

    /// A path value could not be parsed by the delimiter convention.
    #[error("malformed path '{path}': {reason}")]
    MalformedPath {
        /// The raw path value.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Content item not found in the content store.
    #[error("content not found: {id}")]
    ContentNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// A field value had an unexpected shape.
    #[error("invalid field '{field}': {message}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// The index writer failed to persist a record.
    #[error("index write failed for record {record_id} in index {index}: {message}")]
    WriteFailed {
        /// Target index.
        index: IndexName,
        /// Identifier of the record.
        record_id: String,
        /// Description of the failure.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a callback failure error.
    pub fn callback_failure(
        index: IndexName,
        transform: impl Into<String>,
        record_id: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::CallbackFailure {
            index,
            transform: transform.into(),
            record_id: record_id.into(),
            source: source.into(),
        }
    }

    /// Creates a missing scope error.
    pub fn missing_scope(reason: impl Into<String>) -> Self {
        Self::MissingScope {
            reason: reason.into(),
        }
    }

    /// Creates a malformed path error.
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a content not found error.
    pub fn content_not_found(id: impl Into<String>) -> Self {
        Self::ContentNotFound { id: id.into() }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a write failed error.
    pub fn write_failed(
        index: IndexName,
        record_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::WriteFailed {
            index,
            record_id: record_id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if this error came from a transform callback.
    #[must_use]
    pub fn is_callback_failure(&self) -> bool {
        matches!(self, Self::CallbackFailure { .. })
    }
}
