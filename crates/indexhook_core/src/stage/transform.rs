//! The transform callback contract.

use crate::error::BoxError;
use crate::record::{Fields, IndexRecord};
use tracing::warn;

/// Outcome of running a transform on a record.
///
/// - `Ok(None)`: no change, the record passes through untouched.
/// - `Ok(Some(fields))`: `fields` replaces the record's whole mapping.
/// - `Err(_)`: the transform failed.
pub type TransformResult = Result<Option<Fields>, BoxError>;

/// A callback that may rewrite a record's fields before it is indexed.
///
/// Transforms receive the record by shared reference and can never mutate
/// its mapping in place. To change fields, clone [`IndexRecord::fields`],
/// edit the clone and return it.
///
/// Category selectivity is the transform's own job: a transform that does
/// not care about `record.category()` must return `Ok(None)`.
pub trait IndexTransform: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// Inspects the record and optionally returns a replacement mapping.
    fn transform(&self, record: &IndexRecord) -> TransformResult;
}

/// A transform backed by a closure.
pub struct FnTransform<F> {
    name: String,
    func: F,
}

impl<F> IndexTransform for FnTransform<F>
where
    F: Fn(&IndexRecord) -> TransformResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, record: &IndexRecord) -> TransformResult {
        (self.func)(record)
    }
}

/// Wraps a closure as a named transform.
///
/// ```rust
/// use indexhook_core::{from_fn, FieldValue, TransformStage};
///
/// let stage = TransformStage::new();
/// stage.register(
///     "external",
///     from_fn("stamp", |record| {
///         let mut fields = record.fields().clone();
///         fields.push_value("indexedBy", FieldValue::text("stamp"));
///         Ok(Some(fields))
///     }),
/// );
/// ```
pub fn from_fn<F>(name: impl Into<String>, func: F) -> FnTransform<F>
where
    F: Fn(&IndexRecord) -> TransformResult + Send + Sync,
{
    FnTransform {
        name: name.into(),
        func,
    }
}

/// Restricts a transform to records of the given categories.
///
/// An empty category list matches every record.
pub struct ForCategories<T> {
    categories: Vec<String>,
    inner: T,
}

impl<T: IndexTransform> ForCategories<T> {
    /// Creates the filter.
    pub fn new<I, S>(categories: I, inner: T) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            inner,
        }
    }
}

impl<T: IndexTransform> IndexTransform for ForCategories<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn transform(&self, record: &IndexRecord) -> TransformResult {
        if self.categories.is_empty() || record.is_category(&self.categories) {
            self.inner.transform(record)
        } else {
            Ok(None)
        }
    }
}

/// Makes a transform fail-open: errors are logged and dropped.
///
/// The record continues down the chain without this transform's
/// contribution. Use for enrichments whose absence is acceptable.
pub struct FailOpen<T> {
    inner: T,
}

impl<T: IndexTransform> FailOpen<T> {
    /// Wraps `inner`.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: IndexTransform> IndexTransform for FailOpen<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn transform(&self, record: &IndexRecord) -> TransformResult {
        match self.inner.transform(record) {
            Ok(update) => Ok(update),
            Err(error) => {
                warn!(
                    transform = self.inner.name(),
                    record_id = record.id(),
                    %error,
                    "transform failed, continuing without its changes"
                );
                Ok(None)
            }
        }
    }
}
