//! Error types for the CLI.

use changegate_core::CoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading input documents.
#[derive(Debug, Error)]
pub enum CliError {
    /// The file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: CoreError,
    },
}
