//! Built-in transforms that derive synthetic fields.
//!
//! - [`CombinedFieldTransform`]: `combinedField`, all values joined by newlines
//! - [`SearchPathTransform`]: `searchPath`, the ancestry path as whitespace tokens
//! - [`BreadcrumbTransform`]: `breadcrumb`, ancestor names from the content store

mod breadcrumb;
mod combined;
mod search_path;

pub use breadcrumb::{BreadcrumbTransform, BREADCRUMB_FIELD};
pub use combined::{combine_values, CombinedFieldTransform, COMBINED_FIELD};
pub use search_path::{
    search_path_value, tokenize_path, SearchPathTransform, PATH_DELIMITER, PATH_FIELD,
    SEARCH_PATH_FIELD,
};

use crate::record::IndexRecord;

/// An empty category list applies to every record.
fn applies_to(categories: &[String], record: &IndexRecord) -> bool {
    categories.is_empty() || record.is_category(categories)
}

fn to_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
