//! Path tokenization.
//!
//! Content paths are stored as delimiter-joined ancestry, root first, e.g.
//! `-1,1066,1234,1236`. Most index engines tokenize on whitespace, not on
//! commas, so the raw path matches only as a whole. Rewriting it to
//! `-1 1066 1234 1236` makes every ancestor identifier its own token, and
//! "all descendants of 1066" becomes a plain whole-token match on `1066`.

use super::{applies_to, to_strings};
use crate::error::{CoreError, CoreResult};
use crate::record::{FieldValue, IndexRecord};
use crate::stage::{IndexTransform, TransformResult};
use tracing::warn;

/// Default source field holding the ancestry path.
pub const PATH_FIELD: &str = "path";

/// Default name of the tokenized path field.
pub const SEARCH_PATH_FIELD: &str = "searchPath";

/// Default path delimiter.
pub const PATH_DELIMITER: char = ',';

/// Rewrites a delimited path into whitespace-separated tokens.
///
/// - `""` → `""`
/// - `"1066"` → `"1066"`
/// - `"-1,1066,1234"` → `"-1 1066 1234"`
///
/// # Errors
///
/// Returns [`CoreError::MalformedPath`] if a segment is empty or contains
/// whitespace, since such a path cannot be split back into identifiers.
pub fn tokenize_path(path: &str, delimiter: char) -> CoreResult<String> {
    if path.is_empty() {
        return Ok(String::new());
    }

    let mut tokens = String::with_capacity(path.len());
    for (i, segment) in path.split(delimiter).enumerate() {
        if segment.is_empty() {
            return Err(CoreError::malformed_path(
                path,
                format!("empty segment at position {i}"),
            ));
        }
        if segment.chars().any(char::is_whitespace) {
            return Err(CoreError::malformed_path(
                path,
                format!("whitespace in segment '{segment}'"),
            ));
        }
        if i > 0 {
            tokens.push(' ');
        }
        tokens.push_str(segment);
    }
    Ok(tokens)
}

/// Like [`tokenize_path`], but a malformed path comes back unchanged.
///
/// Path search is an enhancement; a bad path is logged, not fatal.
#[must_use]
pub fn search_path_value(path: &str, delimiter: char) -> String {
    tokenize_or_raw(path, delimiter, None)
}

fn tokenize_or_raw(path: &str, delimiter: char, record_id: Option<&str>) -> String {
    match tokenize_path(path, delimiter) {
        Ok(tokens) => tokens,
        Err(error) => {
            warn!(record_id, %error, "emitting path unchanged");
            path.to_string()
        }
    }
}

/// Adds `searchPath`, the record's ancestry path as whitespace tokens.
///
/// Records without the source field pass through unchanged. A source field
/// with no non-null value yields an empty `searchPath`.
#[derive(Debug, Clone)]
pub struct SearchPathTransform {
    categories: Vec<String>,
    source: String,
    target: String,
    delimiter: char,
}

impl SearchPathTransform {
    /// Creates the transform for the given categories (empty = all).
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: to_strings(categories),
            source: PATH_FIELD.to_string(),
            target: SEARCH_PATH_FIELD.to_string(),
            delimiter: PATH_DELIMITER,
        }
    }

    /// Reads the path from `source` instead of `path`.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Writes to `target` instead of `searchPath`.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Uses `delimiter` instead of `,`.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl IndexTransform for SearchPathTransform {
    fn name(&self) -> &str {
        "search_path"
    }

    fn transform(&self, record: &IndexRecord) -> TransformResult {
        if !applies_to(&self.categories, record) || !record.fields().contains(&self.source) {
            return Ok(None);
        }

        let raw = record
            .fields()
            .first(&self.source)
            .and_then(FieldValue::to_text)
            .unwrap_or_default();
        let value = FieldValue::Text(tokenize_or_raw(&raw, self.delimiter, Some(record.id())));
        if record.fields().get(&self.target) == Some(std::slice::from_ref(&value)) {
            return Ok(None);
        }

        let mut fields = record.fields().clone();
        fields.insert(self.target.clone(), vec![value]);
        Ok(Some(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Fields;

    #[test]
    fn tokenizes_full_path() {
        assert_eq!(tokenize_path("-1,1066,1234,1236", ',').unwrap(), "-1 1066 1234 1236");
    }

    #[test]
    fn empty_path_stays_empty() {
        assert_eq!(tokenize_path("", ',').unwrap(), "");
    }

    #[test]
    fn root_item_unchanged() {
        assert_eq!(tokenize_path("1066", ',').unwrap(), "1066");
    }

    #[test]
    fn malformed_paths() {
        for bad in ["-1,,1066", ",1066", "1066,", "-1,10 66"] {
            let err = tokenize_path(bad, ',').unwrap_err();
            assert!(matches!(err, CoreError::MalformedPath { .. }), "{bad}");
            assert_eq!(search_path_value(bad, ','), bad);
        }
    }

    #[test]
    fn custom_delimiter() {
        assert_eq!(tokenize_path("a/b/c", '/').unwrap(), "a b c");
    }

    fn record(fields: Fields) -> IndexRecord {
        IndexRecord::new("1236", "content", fields)
    }

    fn search_path(fields: &Fields) -> Option<&str> {
        fields.first(SEARCH_PATH_FIELD).and_then(FieldValue::as_text)
    }

    #[test]
    fn transform_adds_search_path() {
        let t = SearchPathTransform::new(["content"]);
        let fields = t
            .transform(&record(Fields::new().with("path", ["-1,1066,1234,1236"])))
            .unwrap()
            .unwrap();
        assert_eq!(search_path(&fields), Some("-1 1066 1234 1236"));
        assert_eq!(
            fields.first("path").and_then(FieldValue::as_text),
            Some("-1,1066,1234,1236")
        );
    }

    #[test]
    fn empty_path_field_emits_empty_value() {
        let t = SearchPathTransform::new(["content"]);
        let fields = t
            .transform(&record(Fields::new().with("path", [""])))
            .unwrap()
            .unwrap();
        assert_eq!(fields.get(SEARCH_PATH_FIELD), Some(&[FieldValue::text("")][..]));

        let fields = t
            .transform(&record(Fields::new().with("path", Vec::<FieldValue>::new())))
            .unwrap()
            .unwrap();
        assert_eq!(search_path(&fields), Some(""));
    }

    #[test]
    fn missing_path_is_noop() {
        let t = SearchPathTransform::new(["content"]);
        assert!(t
            .transform(&record(Fields::new().with("title", ["x"])))
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_path_degrades() {
        let t = SearchPathTransform::new(["content"]);
        let fields = t
            .transform(&record(Fields::new().with("path", ["-1,,1066"])))
            .unwrap()
            .unwrap();
        assert_eq!(search_path(&fields), Some("-1,,1066"));
    }

    #[test]
    fn integer_root_path() {
        let t = SearchPathTransform::new(Vec::<String>::new());
        let fields = t
            .transform(&record(Fields::new().with("path", [FieldValue::Integer(1066)])))
            .unwrap()
            .unwrap();
        assert_eq!(search_path(&fields), Some("1066"));
    }
}
