//! Scoped consistency context with guaranteed release.

use super::{ContentNode, ContentStore};
use crate::error::{CoreError, CoreResult};
use std::fmt;

/// Opaque token for an open consistency scope.
///
/// Only a [`ContentStore`] creates tokens; the store decides whether a token
/// is still live.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ScopeToken(u64);

impl ScopeToken {
    /// Creates a token. For use by [`ContentStore`] implementations.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope:{}", self.0)
    }
}

/// An open consistency scope against a [`ContentStore`].
///
/// The scope is released exactly once when the guard is dropped, on every
/// exit path: normal return, `?` propagation of a lookup error, or unwinding.
///
/// ```rust
/// use indexhook_core::{ConsistencyScope, ContentNode, InMemoryContentStore};
///
/// let store = InMemoryContentStore::new();
/// store.insert(ContentNode::new("1066", None, "Home"));
///
/// {
///     let scope = ConsistencyScope::acquire(&store).unwrap();
///     let chain = scope.ancestry("1066").unwrap();
///     assert_eq!(chain.len(), 1);
/// }
/// assert_eq!(store.live_scopes(), 0);
/// ```
pub struct ConsistencyScope<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    token: Option<ScopeToken>,
}

impl<'a, S: ContentStore + ?Sized> ConsistencyScope<'a, S> {
    /// Opens a new scope on `store`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingScope`] if the store cannot open one.
    pub fn acquire(store: &'a S) -> CoreResult<Self> {
        let token = store.begin_scope().map_err(|e| match e {
            CoreError::MissingScope { .. } => e,
            other => CoreError::missing_scope(other.to_string()),
        })?;
        Ok(Self {
            store,
            token: Some(token),
        })
    }

    /// Returns the chain from the root down to and including `id`.
    pub fn ancestry(&self, id: &str) -> CoreResult<Vec<ContentNode>> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| CoreError::missing_scope("scope already released"))?;
        self.store.ancestry(token, id)
    }

    /// Releases the scope now instead of at end of block.
    pub fn release(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(token) = self.token.take() {
            self.store.end_scope(token);
        }
    }
}

impl<S: ContentStore + ?Sized> Drop for ConsistencyScope<'_, S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: ContentStore + ?Sized> fmt::Debug for ConsistencyScope<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsistencyScope")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
