//! Test fixtures and pipeline helpers.
//!
//! Provides a small content tree, matching records, a stage wired with the
//! built-in transforms, and temporary JSON files for command-line tests.

use indexhook_core::{
    BreadcrumbTransform, CombinedFieldTransform, ContentNode, FieldValue, Fields, IndexRecord,
    IndexingPipeline, InMemoryContentStore, MemoryIndex, SearchPathTransform, TransformStage,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Index name used by the fixtures.
pub const EXTERNAL_INDEX: &str = "external";

/// Category of content pages.
pub const CONTENT: &str = "content";

/// Category of media items.
pub const MEDIA: &str = "media";

/// Nodes of the sample content tree.
///
/// ```text
/// Home (1066)
/// ├── Products (1234)
/// │   ├── Widget (1236)
/// │   └── Gadget (1237)
/// └── About (1300)
/// Archive (2000)
/// └── Old Widget (2001)
/// ```
pub fn sample_nodes() -> Vec<ContentNode> {
    vec![
        ContentNode::new("1066", None, "Home"),
        ContentNode::new("1234", Some("1066"), "Products"),
        ContentNode::new("1236", Some("1234"), "Widget"),
        ContentNode::new("1237", Some("1234"), "Gadget"),
        ContentNode::new("1300", Some("1066"), "About"),
        ContentNode::new("2000", None, "Archive"),
        ContentNode::new("2001", Some("2000"), "Old Widget"),
    ]
}

/// Creates an in-memory content store holding [`sample_nodes`].
pub fn sample_content_store() -> Arc<InMemoryContentStore> {
    Arc::new(InMemoryContentStore::from_nodes(sample_nodes()))
}

/// Builds a content page record the way an indexer would.
pub fn content_record(id: &str, path: &str, name: &str) -> IndexRecord {
    IndexRecord::new(
        id,
        CONTENT,
        Fields::new()
            .with("nodeName", [name])
            .with("path", [path])
            .with("bodyText", [FieldValue::Null]),
    )
}

/// Builds a media record with a path but no content node.
pub fn media_record(id: &str, path: &str, name: &str) -> IndexRecord {
    IndexRecord::new(
        id,
        MEDIA,
        Fields::new()
            .with("nodeName", [name])
            .with("path", [path])
            .with("umbracoFile", [format!("/media/{id}.png")]),
    )
}

/// Records for every node in the sample tree, plus one media item.
pub fn sample_records() -> Vec<IndexRecord> {
    vec![
        content_record("1066", "-1,1066", "Home"),
        content_record("1234", "-1,1066,1234", "Products"),
        content_record("1236", "-1,1066,1234,1236", "Widget"),
        content_record("1237", "-1,1066,1234,1237", "Gadget"),
        content_record("1300", "-1,1066,1300", "About"),
        content_record("2000", "-1,2000", "Archive"),
        content_record("2001", "-1,2000,2001", "Old Widget"),
        media_record("5000", "-1,5000", "Logo"),
    ]
}

/// Creates a stage with search path, breadcrumb and combined field
/// transforms registered for content records on [`EXTERNAL_INDEX`].
pub fn standard_stage(store: Arc<InMemoryContentStore>) -> Arc<TransformStage> {
    let stage = Arc::new(TransformStage::new());
    stage.register(EXTERNAL_INDEX, SearchPathTransform::new([CONTENT]));
    stage.register(EXTERNAL_INDEX, BreadcrumbTransform::new(store, [CONTENT]));
    stage.register(EXTERNAL_INDEX, CombinedFieldTransform::new([CONTENT]));
    stage
}

/// A pipeline over the sample content store and an in-memory index.
pub struct TestPipeline {
    /// The pipeline instance.
    pub pipeline: IndexingPipeline<MemoryIndex>,
    /// The content store the breadcrumb transform reads from.
    pub store: Arc<InMemoryContentStore>,
}

impl TestPipeline {
    /// Creates a pipeline using [`standard_stage`].
    pub fn new() -> Self {
        let store = sample_content_store();
        let stage = standard_stage(Arc::clone(&store));
        Self {
            pipeline: IndexingPipeline::new(stage, MemoryIndex::new()),
            store,
        }
    }

    /// Creates a pipeline with [`sample_records`] already indexed.
    pub fn populated() -> Self {
        let test = Self::new();
        let outcome = test.pipeline.index_batch(EXTERNAL_INDEX, sample_records());
        assert!(outcome.is_complete(), "sample records failed to index");
        test
    }

    /// Returns the in-memory index.
    pub fn index(&self) -> &MemoryIndex {
        self.pipeline.writer()
    }
}

impl Default for TestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestPipeline {
    type Target = IndexingPipeline<MemoryIndex>;

    fn deref(&self) -> &Self::Target {
        &self.pipeline
    }
}

/// Runs a test with a fresh [`TestPipeline`].
pub fn with_test_pipeline<F, R>(f: F) -> R
where
    F: FnOnce(&TestPipeline) -> R,
{
    let test = TestPipeline::new();
    f(&test)
}

/// A temporary directory of JSON input files.
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    /// Creates an empty fixture directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Serializes `value` as pretty JSON into `name` and returns the path.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> PathBuf {
        let path = self.dir.path().join(name);
        let json = serde_json::to_string_pretty(value).expect("Failed to serialize fixture");
        std::fs::write(&path, json).expect("Failed to write fixture");
        path
    }

    /// Writes raw text into `name` and returns the path.
    pub fn write_text(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).expect("Failed to write fixture");
        path
    }

    /// Writes [`sample_records`] to `records.json`.
    pub fn sample_records_file(&self) -> PathBuf {
        self.write_json("records.json", &sample_records())
    }

    /// Writes [`sample_nodes`] to `nodes.json`.
    pub fn sample_nodes_file(&self) -> PathBuf {
        self.write_json("nodes.json", &sample_nodes())
    }

    /// Writes a transform config equivalent to [`standard_stage`].
    pub fn standard_config_file(&self) -> PathBuf {
        let config = serde_json::json!({
            "indexes": {
                EXTERNAL_INDEX: [
                    { "kind": "search_path", "categories": [CONTENT] },
                    { "kind": "breadcrumb", "categories": [CONTENT] },
                    { "kind": "combined", "categories": [CONTENT] }
                ]
            }
        });
        self.write_json("transforms.json", &config)
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a single chain of `depth` nodes and one record per node.
    ///
    /// Node ids are `n0` (root) through `n{depth-1}`.
    pub fn deep_tree(depth: usize) -> (Arc<InMemoryContentStore>, Vec<IndexRecord>) {
        let store = InMemoryContentStore::new();
        let mut records = Vec::with_capacity(depth);
        let mut path = String::from("-1");

        for level in 0..depth {
            let id = format!("n{level}");
            let parent = level.checked_sub(1).map(|p| format!("n{p}"));
            store.insert(ContentNode::new(&id, parent.as_deref(), format!("Level {level}")));
            path.push(',');
            path.push_str(&id);
            records.push(content_record(&id, &path, &format!("Level {level}")));
        }

        (Arc::new(store), records)
    }

    /// Creates `count` flat content records under a single root.
    pub fn wide_batch(count: usize) -> Vec<IndexRecord> {
        (0..count)
            .map(|i| {
                let id = (10_000 + i).to_string();
                content_record(&id, &format!("-1,1066,{id}"), &format!("Page {i}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexhook_core::{BREADCRUMB_FIELD, SEARCH_PATH_FIELD};

    #[test]
    fn test_populated_pipeline() {
        let test = TestPipeline::populated();
        assert_eq!(test.index().len(EXTERNAL_INDEX), 8);
        assert_eq!(
            test.index().search_field(EXTERNAL_INDEX, SEARCH_PATH_FIELD, "1234"),
            vec!["1234", "1236", "1237"]
        );
        assert_eq!(test.store.live_scopes(), 0);
    }

    #[test]
    fn test_media_skips_breadcrumb() {
        let test = TestPipeline::populated();
        let logo = test.index().document(EXTERNAL_INDEX, "5000").unwrap();
        assert!(!logo.contains(BREADCRUMB_FIELD));
        assert!(!logo.contains(SEARCH_PATH_FIELD));
    }

    #[test]
    fn test_fixture_dir_round_trip() {
        let dir = FixtureDir::new();
        let path = dir.sample_records_file();
        let text = std::fs::read_to_string(path).unwrap();
        let records: Vec<IndexRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(records.len(), sample_records().len());
        assert_eq!(records[2].id(), "1236");
    }

    #[test]
    fn test_deep_tree_scenario() {
        let (store, records) = scenarios::deep_tree(5);
        assert_eq!(store.len(), 5);
        let path = records[4].fields().first("path").unwrap();
        assert_eq!(path.as_text(), Some("-1,n0,n1,n2,n3,n4"));

        let stage = standard_stage(Arc::clone(&store));
        let out = stage.process(EXTERNAL_INDEX, records[4].clone()).unwrap();
        assert_eq!(out.fields().get(BREADCRUMB_FIELD).unwrap().len(), 5);
    }
}
