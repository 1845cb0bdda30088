//! In-memory content store.

use super::{ContentNode, ContentStore, ScopeToken};
use crate::error::{CoreError, CoreResult};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A content tree held in memory.
///
/// Tracks open scopes so tests can check that every scope is released, and
/// supports failure injection for scope acquisition and lookups.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    nodes: RwLock<HashMap<String, ContentNode>>,
    live: Mutex<HashSet<u64>>,
    next_scope: AtomicU64,
    opened: AtomicU64,
    released: AtomicU64,
    fail_scopes: AtomicBool,
    fail_next_lookup: AtomicBool,
}

impl InMemoryContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `nodes`.
    pub fn from_nodes<I: IntoIterator<Item = ContentNode>>(nodes: I) -> Self {
        let store = Self::new();
        for node in nodes {
            store.insert(node);
        }
        store
    }

    /// Inserts or replaces a node.
    pub fn insert(&self, node: ContentNode) {
        self.nodes.write().insert(node.id.clone(), node);
    }

    /// Removes a node, returning it if present.
    pub fn remove(&self, id: &str) -> Option<ContentNode> {
        self.nodes.write().remove(id)
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Returns true if the store has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Makes `begin_scope` fail while set.
    pub fn set_scope_failure(&self, fail: bool) {
        self.fail_scopes.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `ancestry` call fail.
    pub fn fail_next_lookup(&self) {
        self.fail_next_lookup.store(true, Ordering::SeqCst);
    }

    /// Returns the number of scopes ever opened.
    pub fn scopes_opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Returns the number of scopes released.
    pub fn scopes_released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Returns the number of scopes currently open.
    pub fn live_scopes(&self) -> usize {
        self.live.lock().len()
    }
}

impl ContentStore for InMemoryContentStore {
    fn begin_scope(&self) -> CoreResult<ScopeToken> {
        if self.fail_scopes.load(Ordering::SeqCst) {
            return Err(CoreError::invalid_operation("content store unavailable"));
        }
        let raw = self.next_scope.fetch_add(1, Ordering::SeqCst);
        self.live.lock().insert(raw);
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScopeToken::new(raw))
    }

    fn end_scope(&self, token: ScopeToken) {
        if self.live.lock().remove(&token.as_u64()) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ancestry(&self, token: &ScopeToken, id: &str) -> CoreResult<Vec<ContentNode>> {
        if !self.live.lock().contains(&token.as_u64()) {
            return Err(CoreError::missing_scope(format!("{token} is not open")));
        }
        if self.fail_next_lookup.swap(false, Ordering::SeqCst) {
            return Err(CoreError::invalid_operation("injected lookup failure"));
        }

        let nodes = self.nodes.read();
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);

        while let Some(current_id) = current {
            // A dangling parent is an error, not the end of the chain.
            let Some(node) = nodes.get(current_id) else {
                return Err(CoreError::content_not_found(current_id));
            };
            if !seen.insert(node.id.as_str()) {
                return Err(CoreError::invalid_operation(format!(
                    "cycle in content tree at {}",
                    node.id
                )));
            }
            chain.push(node.clone());
            current = node.parent.as_deref();
        }

        chain.reverse();
        Ok(chain)
    }
}
