//! JSON input files: records and content nodes.

use crate::error::{CliError, CliResult};
use indexhook_core::{ContentNode, ContentStore, IndexRecord, InMemoryContentStore};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Reads and parses a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads records: `[{"id", "category", "fields": {name: [values]}}]`.
pub fn load_records(path: &Path) -> CliResult<Vec<IndexRecord>> {
    let records: Vec<IndexRecord> = read_json(path)?;
    tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}

/// Loads content nodes into a store: `[{"id", "parent", "name"}]`.
pub fn load_content(path: &Path) -> CliResult<Arc<dyn ContentStore>> {
    let nodes: Vec<ContentNode> = read_json(path)?;
    tracing::debug!(path = %path.display(), count = nodes.len(), "loaded content nodes");
    let store: Arc<dyn ContentStore> = Arc::new(InMemoryContentStore::from_nodes(nodes));
    Ok(store)
}
