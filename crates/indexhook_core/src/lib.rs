//! # IndexHook Core
//!
//! An index-value transformation stage for search indexing.
//!
//! Just before a record is written to a search index, the indexer hands it
//! to a [`TransformStage`]. Transforms registered for that index run in
//! order and may replace the record's fields, typically to add synthetic
//! fields that make search easier:
//!
//! - [`CombinedFieldTransform`]: one field holding the text of all others
//! - [`SearchPathTransform`]: the ancestry path as whitespace tokens, for
//!   descendant queries
//! - [`BreadcrumbTransform`]: ancestor names looked up in a [`ContentStore`]
//!
//! The crate also provides the collaborator seams ([`IndexWriter`],
//! [`ContentStore`]) and in-memory implementations of both.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod content;
mod derive;
mod error;
mod indexer;
mod record;
mod stage;
mod stats;
mod types;

pub use config::{FailurePolicy, StageConfig};
pub use content::{ConsistencyScope, ContentNode, ContentStore, InMemoryContentStore, ScopeToken};
pub use derive::{
    combine_values, search_path_value, tokenize_path, BreadcrumbTransform,
    CombinedFieldTransform, SearchPathTransform, BREADCRUMB_FIELD, COMBINED_FIELD,
    PATH_DELIMITER, PATH_FIELD, SEARCH_PATH_FIELD,
};
pub use error::{BoxError, CoreError, CoreResult};
pub use indexer::{BatchOutcome, IndexWriter, IndexingPipeline, MemoryIndex, TokenizerConfig};
pub use record::{FieldValue, Fields, IndexRecord};
pub use stage::{
    from_fn, FailOpen, FnTransform, ForCategories, IndexTransform, TransformResult,
    TransformStage,
};
pub use stats::{StageStats, StatsSnapshot};
pub use types::{IndexName, Priority, SubscriptionId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
