//! Process command implementation.

use super::{load_stage, OutputFormat};
use crate::error::CliResult;
use crate::input;
use indexhook_core::{IndexRecord, StatsSnapshot};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Records after the stage ran, with the stage counters.
#[derive(Debug, Serialize)]
pub struct ProcessReport {
    /// Index the records were processed for.
    pub index: String,
    /// Transformed records, in input order.
    pub records: Vec<IndexRecord>,
    /// Stage counters after the run.
    pub stats: StatsSnapshot,
}

/// Runs every input record through the configured stage.
///
/// Stops at the first record the stage rejects.
pub fn execute(
    config: &Path,
    input_path: &Path,
    content: Option<&Path>,
    index: &str,
    trace: bool,
) -> CliResult<ProcessReport> {
    let stage = load_stage(config, content, trace)?;
    let records = input::load_records(input_path)?
        .into_iter()
        .map(|record| stage.process(index, record))
        .collect::<Result<Vec<_>, _>>()?;

    info!(index, count = records.len(), "processed records");
    Ok(ProcessReport {
        index: index.to_string(),
        records,
        stats: stage.stats().snapshot(),
    })
}

/// Runs the process command and prints the result.
pub fn run(
    config: &Path,
    input_path: &Path,
    content: Option<&Path>,
    index: &str,
    format: OutputFormat,
    trace: bool,
) -> CliResult<()> {
    let report = execute(config, input_path, content, index, trace)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text_output(&report),
    }
    Ok(())
}

fn print_text_output(report: &ProcessReport) {
    println!("Index: {}", report.index);
    for record in &report.records {
        println!();
        println!("[{}] {}", record.id(), record.category());
        for (name, values) in record.fields().iter() {
            let rendered: Vec<String> = values
                .iter()
                .map(|v| {
                    v.to_text()
                        .map_or_else(|| "null".to_string(), |t| t.escape_debug().to_string())
                })
                .collect();
            println!("  {name}: {}", rendered.join(" | "));
        }
    }
    println!();
    println!(
        "{} records, {} transform calls, {} replacements",
        report.stats.records_processed, report.stats.invocations, report.stats.replacements
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexhook_core::{CoreError, FieldValue, BREADCRUMB_FIELD, SEARCH_PATH_FIELD};
    use indexhook_testkit::{FixtureDir, EXTERNAL_INDEX};

    #[test]
    fn processes_sample_records() {
        let dir = FixtureDir::new();
        let report = execute(
            &dir.standard_config_file(),
            &dir.sample_records_file(),
            Some(&dir.sample_nodes_file()),
            EXTERNAL_INDEX,
            false,
        )
        .unwrap();

        assert_eq!(report.records.len(), 8);
        let widget = &report.records[2];
        assert_eq!(
            widget.fields().first(SEARCH_PATH_FIELD).and_then(FieldValue::as_text),
            Some("-1 1066 1234 1236")
        );
        let crumbs: Vec<_> = widget
            .fields()
            .get(BREADCRUMB_FIELD)
            .unwrap()
            .iter()
            .filter_map(FieldValue::as_text)
            .collect();
        assert_eq!(crumbs, ["Home", "Products", "Widget"]);
        assert_eq!(report.stats.records_processed, 8);
    }

    #[test]
    fn other_index_passes_through() {
        let dir = FixtureDir::new();
        let report = execute(
            &dir.standard_config_file(),
            &dir.sample_records_file(),
            Some(&dir.sample_nodes_file()),
            "internal",
            false,
        )
        .unwrap();
        assert!(report.records.iter().all(|r| !r.fields().contains(SEARCH_PATH_FIELD)));
        assert_eq!(report.stats.invocations, 0);
    }

    #[test]
    fn unknown_content_fails_closed() {
        let dir = FixtureDir::new();
        let nodes = dir.write_json("partial.json", &indexhook_testkit::sample_nodes()[..1]);
        let err = execute(
            &dir.standard_config_file(),
            &dir.sample_records_file(),
            Some(&nodes),
            EXTERNAL_INDEX,
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::CliError::Core(CoreError::CallbackFailure { .. })
        ));
    }

    #[test]
    fn report_serializes() {
        let dir = FixtureDir::new();
        let report = execute(
            &dir.standard_config_file(),
            &dir.sample_records_file(),
            Some(&dir.sample_nodes_file()),
            EXTERNAL_INDEX,
            false,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["records"][0]["id"], "1066");
        assert_eq!(json["records"][0]["fields"]["searchPath"][0], "-1 1066");
    }
}
