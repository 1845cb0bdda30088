//! Index records and their field mappings.
//!
//! An [`IndexRecord`] is the unit written to a search index. Its fields sit
//! behind an `Arc` so the indexing collaborator may keep sharing the same
//! mapping elsewhere (e.g. in a cache); the stage never mutates it in place.
//! Transforms produce a new [`Fields`] value that replaces the old one.

mod fields;
mod value;

pub use fields::Fields;
pub use value::FieldValue;

use std::sync::Arc;

/// One item about to be committed to a search index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RecordRepr", into = "RecordRepr"))]
pub struct IndexRecord {
    /// Identifier of the content item.
    id: String,
    /// Classification tag (content type discriminator).
    category: String,
    /// Current field mapping.
    fields: Arc<Fields>,
}

impl IndexRecord {
    /// Creates a record.
    pub fn new(id: impl Into<String>, category: impl Into<String>, fields: Fields) -> Self {
        Self::with_shared_fields(id, category, Arc::new(fields))
    }

    /// Creates a record over a mapping that may be shared elsewhere.
    pub fn with_shared_fields(
        id: impl Into<String>,
        category: impl Into<String>,
        fields: Arc<Fields>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            fields,
        }
    }

    /// Returns the content item identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the category tag.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns true if the record's category is one of `categories`.
    #[must_use]
    pub fn is_category<S: AsRef<str>>(&self, categories: &[S]) -> bool {
        categories.iter().any(|c| c.as_ref() == self.category)
    }

    /// Returns the current field mapping.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns the shared handle to the current field mapping.
    #[must_use]
    pub fn shared_fields(&self) -> &Arc<Fields> {
        &self.fields
    }

    /// Replaces the field mapping.
    ///
    /// The previous mapping is left untouched for anyone still holding it.
    pub fn set_fields(&mut self, fields: Fields) {
        self.fields = Arc::new(fields);
    }

}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RecordRepr {
    id: String,
    category: String,
    #[serde(default)]
    fields: Fields,
}

#[cfg(feature = "serde")]
impl From<RecordRepr> for IndexRecord {
    fn from(repr: RecordRepr) -> Self {
        IndexRecord::new(repr.id, repr.category, repr.fields)
    }
}

#[cfg(feature = "serde")]
impl From<IndexRecord> for RecordRepr {
    fn from(record: IndexRecord) -> Self {
        let fields = Arc::try_unwrap(record.fields).unwrap_or_else(|shared| (*shared).clone());
        RecordRepr {
            id: record.id,
            category: record.category,
            fields,
        }
    }
}
