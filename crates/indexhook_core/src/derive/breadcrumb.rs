//! Breadcrumb derivation via the content store.

use super::{applies_to, to_strings};
use crate::content::{ConsistencyScope, ContentStore};
use crate::record::{FieldValue, IndexRecord};
use crate::stage::{IndexTransform, TransformResult};
use std::sync::Arc;
use tracing::debug;

/// Default name of the breadcrumb field.
pub const BREADCRUMB_FIELD: &str = "breadcrumb";

/// Adds `breadcrumb`, one value per ancestor name from root to the item.
///
/// Every invocation opens its own [`ConsistencyScope`]; the scope is
/// released before the transform returns, whether the lookup succeeded or
/// not. A lookup that cannot get a scope fails the transform rather than
/// producing an empty breadcrumb.
#[derive(Clone)]
pub struct BreadcrumbTransform {
    store: Arc<dyn ContentStore>,
    categories: Vec<String>,
    target: String,
    include_self: bool,
}

impl BreadcrumbTransform {
    /// Creates the transform for the given categories (empty = all).
    pub fn new<I, S>(store: Arc<dyn ContentStore>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            categories: to_strings(categories),
            target: BREADCRUMB_FIELD.to_string(),
            include_self: true,
        }
    }

    /// Writes to `target` instead of `breadcrumb`.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Whether the item's own name ends the breadcrumb (default `true`).
    #[must_use]
    pub fn include_self(mut self, value: bool) -> Self {
        self.include_self = value;
        self
    }
}

impl IndexTransform for BreadcrumbTransform {
    fn name(&self) -> &str {
        "breadcrumb"
    }

    fn transform(&self, record: &IndexRecord) -> TransformResult {
        if !applies_to(&self.categories, record) {
            return Ok(None);
        }

        let mut chain = {
            let scope = ConsistencyScope::acquire(self.store.as_ref())?;
            scope.ancestry(record.id())?
        };
        if !self.include_self {
            chain.pop();
        }
        debug!(record_id = record.id(), depth = chain.len(), "resolved breadcrumb");

        let values = chain
            .into_iter()
            .map(|node| FieldValue::Text(node.name))
            .collect();
        let mut fields = record.fields().clone();
        fields.insert(self.target.clone(), values);
        Ok(Some(fields))
    }
}

impl std::fmt::Debug for BreadcrumbTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreadcrumbTransform")
            .field("categories", &self.categories)
            .field("target", &self.target)
            .field("include_self", &self.include_self)
            .finish_non_exhaustive()
    }
}
