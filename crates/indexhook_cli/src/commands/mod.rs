//! CLI command implementations.

pub mod process;
pub mod search;

use crate::config::TransformConfig;
use crate::error::{CliError, CliResult};
use crate::input;
use clap::ValueEnum;
use indexhook_core::TransformStage;
use std::path::Path;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Builds a stage from a config file and an optional content file.
pub fn load_stage(
    config: &Path,
    content: Option<&Path>,
    trace_invocations: bool,
) -> CliResult<TransformStage> {
    let config = TransformConfig::load(config)?;
    let store = content.map(input::load_content).transpose()?;
    if store.is_none() && config.needs_content() {
        return Err(CliError::config(
            "breadcrumb transform requires --content <nodes.json>",
        ));
    }
    config.build_stage(store, trace_invocations)
}
