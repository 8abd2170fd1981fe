//! changegate CLI
//!
//! Command-line front end for structural change detection.
//!
//! # Commands
//!
//! - `diff` - Compare two JSON documents and report the first difference
//! - `version` - Show version information

mod commands;
mod error;

use changegate_core::DiffOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Structural change detection for JSON documents.
#[derive(Parser)]
#[command(name = "changegate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two JSON documents
    Diff {
        /// Baseline document
        old: PathBuf,

        /// Edited document
        new: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Treat nesting deeper than this many levels as a change
        #[arg(long)]
        max_depth: Option<usize>,

        /// Exit with status 1 when the documents differ
        #[arg(long)]
        exit_code: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Diff {
            old,
            new,
            format,
            max_depth,
            exit_code,
        } => {
            let options = match max_depth {
                Some(depth) => DiffOptions::new().max_depth(depth),
                None => DiffOptions::new(),
            };
            let changed = commands::diff::run(&old, &new, &format, options)?;
            if changed && exit_code {
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Version => {
            println!("changegate CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("changegate core v{}", changegate_core::VERSION);
        }
    }

    Ok(ExitCode::SUCCESS)
}
