//! Core type definitions.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of a search index (e.g. `external`, `internal`, `members`).
///
/// Transforms are registered per index; a record is processed against the
/// transforms of the index it is destined for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexName(Arc<str>);

impl IndexName {
    /// Creates a new index name.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for IndexName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IndexName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for IndexName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Handle returned by a transform registration.
///
/// Subscription IDs are monotonically increasing and never reused within a
/// stage, so a stale handle can never remove a newer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl SubscriptionId {
    /// Creates a subscription ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Where a new registration lands in an index's invocation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Run after every transform already registered.
    #[default]
    Append,
    /// Run before every transform already registered.
    First,
}
