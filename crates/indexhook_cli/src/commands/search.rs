//! Search command implementation.

use super::{load_stage, OutputFormat};
use crate::error::CliResult;
use crate::input;
use indexhook_core::{IndexingPipeline, MemoryIndex};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Ids of the records matching a query.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    /// Field searched, or `None` for all fields.
    pub field: Option<String>,
    /// The query text.
    pub query: String,
    /// Matching record ids, sorted.
    pub hits: Vec<String>,
}

/// Indexes the input records through the stage, then runs one query.
pub fn execute(
    config: &Path,
    input_path: &Path,
    content: Option<&Path>,
    index: &str,
    field: Option<&str>,
    query: &str,
    trace: bool,
) -> CliResult<SearchResult> {
    let stage = Arc::new(load_stage(config, content, trace)?);
    let pipeline = IndexingPipeline::new(stage, MemoryIndex::new());

    let outcome = pipeline.index_batch(index, input::load_records(input_path)?);
    if let Some(error) = outcome.error {
        return Err(error.into());
    }
    info!(index, persisted = outcome.persisted, "indexed records");

    let hits = match field {
        Some(field) => pipeline.writer().search_field(index, field, query),
        None => pipeline.writer().search(index, query),
    };
    Ok(SearchResult {
        field: field.map(str::to_string),
        query: query.to_string(),
        hits,
    })
}

/// Runs the search command and prints the result.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Path,
    input_path: &Path,
    content: Option<&Path>,
    index: &str,
    field: Option<&str>,
    query: &str,
    format: OutputFormat,
    trace: bool,
) -> CliResult<()> {
    let result = execute(config, input_path, content, index, field, query, trace)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("{} hit(s) for {:?}", result.hits.len(), result.query);
            for id in &result.hits {
                println!("  {id}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexhook_core::SEARCH_PATH_FIELD;
    use indexhook_testkit::{FixtureDir, EXTERNAL_INDEX};

    fn search(field: Option<&str>, query: &str) -> Vec<String> {
        let dir = FixtureDir::new();
        execute(
            &dir.standard_config_file(),
            &dir.sample_records_file(),
            Some(&dir.sample_nodes_file()),
            EXTERNAL_INDEX,
            field,
            query,
            false,
        )
        .unwrap()
        .hits
    }

    #[test]
    fn descendants_by_search_path() {
        assert_eq!(
            search(Some(SEARCH_PATH_FIELD), "1066"),
            ["1066", "1234", "1236", "1237", "1300"]
        );
        assert_eq!(search(Some(SEARCH_PATH_FIELD), "2000"), ["2000", "2001"]);
    }

    #[test]
    fn raw_path_is_not_tokenized() {
        assert!(search(Some("path"), "1066").is_empty());
    }

    #[test]
    fn breadcrumb_and_combined_text() {
        assert_eq!(search(Some("breadcrumb"), "products"), ["1234", "1236", "1237"]);
        assert_eq!(search(None, "old widget"), ["2001"]);
    }
}
