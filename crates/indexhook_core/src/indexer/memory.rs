//! In-memory token index.
//!
//! A small inverted index used to exercise the pipeline end to end:
//! - Per-field inverted index: (field, token) → record ids
//! - Forward index: record id → stored fields and indexed postings
//! - Whole-token matching with AND semantics, no ranking
//!
//! The default tokenizer splits on whitespace only, like a whitespace
//! analyzer in a full-text engine. A raw path such as `-1,1066,1234` is
//! therefore a single token, and descendant queries go through the
//! tokenized `searchPath` field instead.

use super::IndexWriter;
use crate::error::{CoreError, CoreResult};
use crate::record::{Fields, IndexRecord};
use crate::types::IndexName;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Configuration for the index tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Minimum token length to index.
    pub min_token_length: usize,
    /// Maximum token length to index.
    pub max_token_length: usize,
    /// Whether to perform case-insensitive matching.
    pub case_insensitive: bool,
    /// Whether ASCII punctuation also separates tokens.
    pub split_punctuation: bool,
    /// Additional characters to treat as separators.
    pub extra_separators: Vec<char>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_length: 1,
            max_token_length: 256,
            case_insensitive: true,
            split_punctuation: false,
            extra_separators: vec![],
        }
    }
}

impl TokenizerConfig {
    /// Creates a new tokenizer configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets maximum token length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_token_length = len;
        self
    }

    /// Sets case sensitivity.
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }

    /// Also splits on ASCII punctuation.
    #[must_use]
    pub fn split_punctuation(mut self) -> Self {
        self.split_punctuation = true;
        self
    }

    /// Adds extra separator characters.
    #[must_use]
    pub fn with_separators(mut self, chars: &[char]) -> Self {
        self.extra_separators.extend_from_slice(chars);
        self
    }

    fn is_separator(&self, c: char) -> bool {
        c.is_whitespace()
            || (self.split_punctuation && c.is_ascii_punctuation())
            || self.extra_separators.contains(&c)
    }

    fn normalize(&self, token: &str) -> String {
        if self.case_insensitive {
            token.to_lowercase()
        } else {
            token.to_string()
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c| self.is_separator(c))
            .filter(|t| {
                let len = t.chars().count();
                len >= self.min_token_length.max(1) && len <= self.max_token_length
            })
            .map(|t| self.normalize(t))
            .collect()
    }
}

/// A posting key: field name and normalized token.
type Posting = (String, String);

struct StoredRecord {
    category: String,
    fields: Arc<Fields>,
    postings: HashSet<Posting>,
}

#[derive(Default)]
struct TokenIndex {
    inverted: HashMap<Posting, HashSet<String>>,
    forward: HashMap<String, StoredRecord>,
}

impl TokenIndex {
    fn remove(&mut self, id: &str) -> bool {
        let Some(stored) = self.forward.remove(id) else {
            return false;
        };
        for posting in &stored.postings {
            if let Some(ids) = self.inverted.get_mut(posting) {
                ids.remove(id);
                if ids.is_empty() {
                    self.inverted.remove(posting);
                }
            }
        }
        true
    }

    fn matching(&self, field: Option<&str>, tokens: &[String]) -> BTreeSet<String> {
        let mut results: Option<HashSet<&String>> = None;
        for token in tokens {
            let hits: HashSet<&String> = match field {
                Some(field) => self
                    .inverted
                    .get(&(field.to_string(), token.clone()))
                    .map(|ids| ids.iter().collect())
                    .unwrap_or_default(),
                None => self
                    .inverted
                    .iter()
                    .filter(|((_, t), _)| t == token)
                    .flat_map(|(_, ids)| ids.iter())
                    .collect(),
            };
            let next = match results {
                Some(prev) => prev.intersection(&hits).copied().collect(),
                None => hits,
            };
            if next.is_empty() {
                return BTreeSet::new();
            }
            results = Some(next);
        }
        results
            .map(|ids| ids.into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// In-memory search index keyed by index name.
pub struct MemoryIndex {
    tokenizer: TokenizerConfig,
    indexes: RwLock<HashMap<IndexName, TokenIndex>>,
    writes: AtomicU64,
    read_only: AtomicBool,
}

impl MemoryIndex {
    /// Creates an empty index with the default whitespace tokenizer.
    pub fn new() -> Self {
        Self::with_tokenizer(TokenizerConfig::default())
    }

    /// Creates an empty index with a custom tokenizer.
    pub fn with_tokenizer(tokenizer: TokenizerConfig) -> Self {
        Self {
            tokenizer,
            indexes: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
            read_only: AtomicBool::new(false),
        }
    }

    /// Rejects further writes and deletes while set.
    pub fn set_read_only(&self, value: bool) {
        self.read_only.store(value, Ordering::Relaxed);
    }

    /// Returns the number of records stored in an index.
    pub fn len(&self, index: &str) -> usize {
        self.indexes.read().get(index).map_or(0, |i| i.forward.len())
    }

    /// Returns true if an index holds no records.
    pub fn is_empty(&self, index: &str) -> bool {
        self.len(index) == 0
    }

    /// Returns the number of successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the stored fields of a record.
    pub fn document(&self, index: &str, id: &str) -> Option<Arc<Fields>> {
        self.indexes
            .read()
            .get(index)?
            .forward
            .get(id)
            .map(|stored| Arc::clone(&stored.fields))
    }

    /// Returns the stored category of a record.
    pub fn category(&self, index: &str, id: &str) -> Option<String> {
        self.indexes
            .read()
            .get(index)?
            .forward
            .get(id)
            .map(|stored| stored.category.clone())
    }

    /// Finds records whose `field` contains every token of `query`.
    ///
    /// Ids are returned sorted. An empty query matches nothing.
    pub fn search_field(&self, index: &str, field: &str, query: &str) -> Vec<String> {
        self.search_inner(index, Some(field), query)
    }

    /// Finds records where every token of `query` appears in some field.
    pub fn search(&self, index: &str, query: &str) -> Vec<String> {
        self.search_inner(index, None, query)
    }

    fn search_inner(&self, index: &str, field: Option<&str>, query: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        let indexes = self.indexes.read();
        indexes
            .get(index)
            .map(|i| i.matching(field, &tokens).into_iter().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexWriter for MemoryIndex {
    fn write(&self, index: &IndexName, record: &IndexRecord) -> CoreResult<()> {
        if record.id().is_empty() {
            return Err(CoreError::invalid_field("id", "record id must not be empty"));
        }
        if self.read_only.load(Ordering::Relaxed) {
            return Err(CoreError::write_failed(
                index.clone(),
                record.id(),
                "index is read-only",
            ));
        }

        let mut postings = HashSet::new();
        for (name, values) in record.fields().iter() {
            for text in values.iter().filter_map(|v| v.to_text()) {
                for token in self.tokenizer.tokenize(&text) {
                    postings.insert((name.to_string(), token));
                }
            }
        }

        let mut indexes = self.indexes.write();
        let target = indexes.entry(index.clone()).or_default();
        target.remove(record.id());
        for posting in &postings {
            target
                .inverted
                .entry(posting.clone())
                .or_default()
                .insert(record.id().to_string());
        }
        target.forward.insert(
            record.id().to_string(),
            StoredRecord {
                category: record.category().to_string(),
                fields: Arc::clone(record.shared_fields()),
                postings,
            },
        );
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, index: &IndexName, id: &str) -> CoreResult<bool> {
        if self.read_only.load(Ordering::Relaxed) {
            return Err(CoreError::write_failed(index.clone(), id, "index is read-only"));
        }
        Ok(self
            .indexes
            .write()
            .get_mut(index.as_str())
            .is_some_and(|i| i.remove(id)))
    }
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let indexes = self.indexes.read();
        let sizes: Vec<_> = indexes
            .iter()
            .map(|(name, i)| (name.as_str().to_string(), i.forward.len()))
            .collect();
        f.debug_struct("MemoryIndex")
            .field("indexes", &sizes)
            .field("writes", &self.write_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn write(index: &MemoryIndex, id: &str, fields: Fields) {
        index
            .write(&IndexName::new("ext"), &IndexRecord::new(id, "content", fields))
            .unwrap();
    }

    #[test]
    fn whitespace_tokenizer_keeps_punctuation() {
        let config = TokenizerConfig::default();
        assert_eq!(config.tokenize("-1,1066 Hello"), vec!["-1,1066", "hello"]);
        assert_eq!(
            config.split_punctuation().tokenize("a,b"),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn custom_tokenizer_options() {
        let config = TokenizerConfig::new()
            .case_sensitive()
            .max_length(5)
            .with_separators(&['/', '|']);
        let index = MemoryIndex::with_tokenizer(config);
        write(&index, "1", Fields::new().with("title", ["Home/About|Averylongword"]));

        assert_eq!(index.search("ext", "Home About"), vec!["1"]);
        assert!(index.search("ext", "home").is_empty());
        assert!(index.search("ext", "Averylongword").is_empty());
    }

    #[test]
    fn field_scoped_search() {
        let index = MemoryIndex::new();
        write(&index, "1", Fields::new().with("title", ["Red Widget"]));
        write(&index, "2", Fields::new().with("body", ["red"]));

        assert_eq!(index.search_field("ext", "title", "red"), vec!["1"]);
        assert_eq!(index.search("ext", "red"), vec!["1", "2"]);
        assert_eq!(index.search("ext", "red widget"), vec!["1"]);
        assert!(index.search("ext", "").is_empty());
    }

    #[test]
    fn rewrite_replaces_postings() {
        let index = MemoryIndex::new();
        write(&index, "1", Fields::new().with("title", ["old"]));
        write(&index, "1", Fields::new().with("title", ["new"]));

        assert!(index.search("ext", "old").is_empty());
        assert_eq!(index.search("ext", "new"), vec!["1"]);
        assert_eq!(index.len("ext"), 1);
        assert_eq!(index.write_count(), 2);
    }

    #[test]
    fn delete_removes_record() {
        let index = MemoryIndex::new();
        write(&index, "1", Fields::new().with("title", ["x"]));
        let name = IndexName::new("ext");

        assert!(index.delete(&name, "1").unwrap());
        assert!(!index.delete(&name, "1").unwrap());
        assert!(index.is_empty("ext"));
        assert!(index.search("ext", "x").is_empty());
    }

    #[test]
    fn stores_fields_and_skips_nulls() {
        let index = MemoryIndex::new();
        write(
            &index,
            "1",
            Fields::new().with("a", [FieldValue::Null, FieldValue::Integer(5)]),
        );
        assert_eq!(index.search_field("ext", "a", "5"), vec!["1"]);
        assert!(index.document("ext", "1").unwrap().contains("a"));
        assert_eq!(index.category("ext", "1").as_deref(), Some("content"));
    }

    #[test]
    fn rejects_empty_id() {
        let index = MemoryIndex::new();
        let err = index
            .write(&IndexName::new("ext"), &IndexRecord::new("", "content", Fields::new()))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidField { ref field, .. } if field == "id"));
        assert_eq!(index.write_count(), 0);
    }

    #[test]
    fn read_only_rejects_writes() {
        let index = MemoryIndex::new();
        write(&index, "1", Fields::new().with("title", ["x"]));
        index.set_read_only(true);

        let name = IndexName::new("ext");
        let err = index
            .write(&name, &IndexRecord::new("2", "content", Fields::new()))
            .unwrap_err();
        assert!(matches!(err, CoreError::WriteFailed { .. }));
        assert!(index.delete(&name, "1").is_err());

        index.set_read_only(false);
        assert!(index.delete(&name, "1").unwrap());
    }
}
