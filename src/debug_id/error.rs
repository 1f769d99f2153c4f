//! Error types for the debug id staging pipeline.
//!
//! Per-file failures (`BundleRead`, `MapParse`, ...) are logged by the unit that
//! hit them and never leave it. Batch-level failures (`InvalidPattern`,
//! `StagingDir`, `UploadFailed`, ...) travel up to the orchestrator's single
//! top-level handler.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while staging and uploading debug id bundles
#[derive(Error, Debug)]
pub enum Error {
    /// The bundle file could not be read as text
    #[error("failed to read bundle {path}: {source}")]
    BundleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stamped bundle could not be written to the staging directory
    #[error("failed to write staged bundle {path}: {source}")]
    BundleWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source map file could not be read as text
    #[error("failed to read source map {path}: {source}")]
    MapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source map is not a JSON object
    #[error("failed to parse source map {path}: {reason}")]
    MapParse { path: PathBuf, reason: String },

    /// The transformed source map could not be written
    #[error("failed to write staged source map {path}: {source}")]
    MapWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An include, ignore or delete pattern is not a valid glob
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The staging directory could not be created
    #[error("failed to create staging directory {path}: {source}")]
    StagingDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No upload client executable could be located
    #[error("upload client `{name}` not found: {reason}")]
    UploaderNotFound { name: String, reason: String },

    /// The upload client ran but reported failure
    #[error("upload failed: {command} - {reason}")]
    UploadFailed { command: String, reason: String },

    /// IO error with the action and path that caused it
    #[error("{action} {path}: {source}")]
    Fs {
        action: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bare IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

/// Attaches an action and a path to IO failures.
pub trait ErrorExt<T> {
    /// Maps an `io::Error` into [`Error::Fs`] describing what was being done.
    fn fs_context(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, action: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            action: action.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_keeps_action_and_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Err::<(), _>(io)
            .fs_context("removing asset", Path::new("/tmp/a.js"))
            .unwrap_err();
        assert_eq!(err.to_string(), "removing asset /tmp/a.js: gone");
    }
}
