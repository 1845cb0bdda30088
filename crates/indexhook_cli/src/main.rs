//! IndexHook CLI
//!
//! Runs records through a configured transform stage from the command line.
//!
//! # Commands
//!
//! - `process` - Transform records and print the result
//! - `search` - Index records in memory and query them
//! - `version` - Show version information

mod commands;
mod config;
mod error;
mod input;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// IndexHook command-line tools.
#[derive(Parser)]
#[command(name = "indexhook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output, including each transform invocation
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by the record commands.
#[derive(clap::Args)]
struct StageArgs {
    /// Transform config file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Records file (JSON array)
    #[arg(short, long)]
    input: PathBuf,

    /// Content nodes file (JSON array), required for breadcrumbs
    #[arg(long)]
    content: Option<PathBuf>,

    /// Index the records are destined for
    #[arg(long, default_value = "external")]
    index: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform records and print the result
    Process {
        #[command(flatten)]
        stage: StageArgs,
    },

    /// Index records in memory and print the ids matching a query
    Search {
        #[command(flatten)]
        stage: StageArgs,

        /// Field to search (all fields if omitted)
        #[arg(long)]
        field: Option<String>,

        /// Query text; every token must match
        #[arg(short, long)]
        query: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process { stage } => {
            commands::process::run(
                &stage.config,
                &stage.input,
                stage.content.as_deref(),
                &stage.index,
                stage.format,
                cli.verbose,
            )?;
        }
        Commands::Search {
            stage,
            field,
            query,
        } => {
            commands::search::run(
                &stage.config,
                &stage.input,
                stage.content.as_deref(),
                &stage.index,
                field.as_deref(),
                &query,
                stage.format,
                cli.verbose,
            )?;
        }
        Commands::Version => {
            println!("IndexHook CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("IndexHook Core v{}", indexhook_core::VERSION);
        }
    }

    Ok(())
}
