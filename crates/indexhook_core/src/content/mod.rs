//! Content-store collaborator.
//!
//! Some transforms need data that is not on the record, such as the names
//! of a content item's ancestors. Reads against the content store must run
//! inside a [`ConsistencyScope`]. Indexing usually runs on a background
//! worker, so a transform must open its own scope rather than assume the
//! caller already holds one.

mod memory;
mod scope;

pub use memory::InMemoryContentStore;
pub use scope::{ConsistencyScope, ScopeToken};

use crate::error::CoreResult;

/// A node in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentNode {
    /// Content item identifier.
    pub id: String,
    /// Parent identifier, `None` for a root item.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<String>,
    /// Display name.
    pub name: String,
}

impl ContentNode {
    /// Creates a node.
    pub fn new(id: impl Into<String>, parent: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: parent.map(str::to_string),
            name: name.into(),
        }
    }
}

/// External content store consulted by ancestry-aware transforms.
///
/// # Contract
///
/// - `begin_scope` opens a consistency context and returns its token.
/// - `end_scope` closes it. It is called exactly once per token by
///   [`ConsistencyScope`].
/// - `ancestry` must reject tokens that are not live with
///   [`CoreError::MissingScope`](crate::CoreError::MissingScope) instead of
///   returning an empty chain.
/// - `ancestry` fails with
///   [`CoreError::ContentNotFound`](crate::CoreError::ContentNotFound) when
///   the node or any ancestor it references is missing. It never returns a
///   truncated chain.
pub trait ContentStore: Send + Sync {
    /// Opens a consistency scope.
    fn begin_scope(&self) -> CoreResult<ScopeToken>;

    /// Closes a consistency scope.
    fn end_scope(&self, token: ScopeToken);

    /// Returns the chain from the root down to and including `id`.
    fn ancestry(&self, token: &ScopeToken, id: &str) -> CoreResult<Vec<ContentNode>>;
}
