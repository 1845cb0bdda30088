//! Copy-on-write registration lists, one per index.

use crate::stage::IndexTransform;
use crate::types::{IndexName, Priority, SubscriptionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A transform registered against an index.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: SubscriptionId,
    pub(crate) transform: Arc<dyn IndexTransform>,
}

/// Immutable snapshot of one index's invocation list.
pub(crate) type Chain = Arc<Vec<Registration>>;

/// Registration lists keyed by index.
///
/// Every mutation builds a new list and swaps it in, so a reader holding a
/// [`Chain`] keeps iterating a stable list while registrations change.
/// The lock is only held for the swap or for cloning the `Arc`, never while
/// a transform runs.
pub(crate) struct Registry {
    chains: RwLock<HashMap<IndexName, Chain>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Adds a transform to an index's list.
    pub(crate) fn add(
        &self,
        index: IndexName,
        transform: Arc<dyn IndexTransform>,
        priority: Priority,
    ) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let registration = Registration { id, transform };

        let mut chains = self.chains.write();
        let current = chains.get(&index).map(|c| c.as_slice()).unwrap_or(&[]);
        let mut next = Vec::with_capacity(current.len() + 1);
        match priority {
            Priority::Append => {
                next.extend_from_slice(current);
                next.push(registration);
            }
            Priority::First => {
                next.push(registration);
                next.extend_from_slice(current);
            }
        }
        chains.insert(index, Arc::new(next));
        id
    }

    /// Removes a registration. Returns false if the handle is unknown.
    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut chains = self.chains.write();
        let Some(index) = chains
            .iter()
            .find(|(_, chain)| chain.iter().any(|r| r.id == id))
            .map(|(index, _)| index.clone())
        else {
            return false;
        };

        let remaining: Vec<Registration> = chains[&index]
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        if remaining.is_empty() {
            chains.remove(&index);
        } else {
            chains.insert(index, Arc::new(remaining));
        }
        true
    }

    /// Returns the current list for an index.
    pub(crate) fn snapshot(&self, index: &str) -> Option<(IndexName, Chain)> {
        let chains = self.chains.read();
        chains
            .get_key_value(index)
            .map(|(name, chain)| (name.clone(), Arc::clone(chain)))
    }

    pub(crate) fn len(&self, index: &str) -> usize {
        self.chains.read().get(index).map_or(0, |c| c.len())
    }

    pub(crate) fn indexes(&self) -> Vec<IndexName> {
        let mut names: Vec<_> = self.chains.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn clear(&self) {
        self.chains.write().clear();
    }
}
