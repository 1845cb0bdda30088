//! CLI error types.

use indexhook_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by the command-line tools.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid JSON for its expected shape.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Output could not be serialized.
    #[error("cannot serialize output: {0}")]
    Output(#[from] serde_json::Error),

    /// The transform configuration is inconsistent.
    #[error("invalid transform config: {0}")]
    Config(String),

    /// The stage or pipeline failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CliError {
    /// Creates a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
