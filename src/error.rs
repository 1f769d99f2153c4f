//! Error types for the command line tool.
//!
//! Library-level failures live in [`crate::debug_id::Error`]; this module wraps
//! them together with CLI and configuration failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Main error type for the binary
#[derive(Error, Debug)]
pub enum AppError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file errors
    #[error("Invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Pipeline errors
    #[error("Debug ID upload error: {0}")]
    DebugId(#[from] crate::debug_id::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// The batch ran but failed and `--strict` was given
    #[error("Batch failed: {reason}")]
    BatchFailed {
        /// Reason for the error
        reason: String,
    },
}
