//! Composite-field derivation.

use super::{applies_to, to_strings};
use crate::record::{FieldValue, Fields, IndexRecord};
use crate::stage::{IndexTransform, TransformResult};

/// Default name of the composite field.
pub const COMBINED_FIELD: &str = "combinedField";

/// Joins every non-null value of every field with `\n`.
///
/// Fields are visited in mapping order, values in per-field order. Nulls are
/// skipped without leaving a blank line. The result depends only on the
/// mapping, so the same input always yields the same string.
///
/// ```rust
/// use indexhook_core::{combine_values, FieldValue, Fields};
///
/// let fields = Fields::new()
///     .with("a", [FieldValue::text("x"), FieldValue::Null])
///     .with("b", [FieldValue::text("y")]);
/// assert_eq!(combine_values(&fields), "x\ny");
/// ```
#[must_use]
pub fn combine_values(fields: &Fields) -> String {
    combine_matching(fields, |_| true)
}

fn combine_matching(fields: &Fields, include: impl Fn(&str) -> bool) -> String {
    let mut combined = String::new();
    let values = fields
        .iter()
        .filter(|(name, _)| include(name))
        .flat_map(|(_, values)| values.iter())
        .filter_map(FieldValue::to_text);

    for (i, text) in values.enumerate() {
        if i > 0 {
            combined.push('\n');
        }
        combined.push_str(&text);
    }
    combined
}

/// Adds a composite field holding the text of all other fields.
///
/// Lets a single query match across every field of a record. The target
/// field itself is never part of its own input, so running the transform
/// again on its output is a no-op.
#[derive(Debug, Clone)]
pub struct CombinedFieldTransform {
    categories: Vec<String>,
    target: String,
    sources: Option<Vec<String>>,
}

impl CombinedFieldTransform {
    /// Creates the transform for the given categories (empty = all).
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: to_strings(categories),
            target: COMBINED_FIELD.to_string(),
            sources: None,
        }
    }

    /// Writes to `target` instead of `combinedField`.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Only combines the named fields. Mapping order still applies.
    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Some(to_strings(sources));
        self
    }

    /// Computes the composite value for `fields`.
    #[must_use]
    pub fn derive(&self, fields: &Fields) -> String {
        combine_matching(fields, |name| {
            name != self.target
                && self
                    .sources
                    .as_ref()
                    .map_or(true, |sources| sources.iter().any(|s| s == name))
        })
    }
}

impl IndexTransform for CombinedFieldTransform {
    fn name(&self) -> &str {
        "combined_field"
    }

    fn transform(&self, record: &IndexRecord) -> TransformResult {
        if !applies_to(&self.categories, record) {
            return Ok(None);
        }

        let value = FieldValue::Text(self.derive(record.fields()));
        if record.fields().get(&self.target) == Some(std::slice::from_ref(&value)) {
            return Ok(None);
        }

        let mut fields = record.fields().clone();
        fields.insert(self.target.clone(), vec![value]);
        Ok(Some(fields))
    }
}
