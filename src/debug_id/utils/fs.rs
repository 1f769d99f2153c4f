//! File system helpers with idempotent semantics.
//!
//! Removing something that is already gone is success, which is what cleanup
//! and post-upload deletion both want.

use crate::debug_id::error::{ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists. Returns whether a file was actually removed.
pub async fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false), // Idempotent
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removing_missing_paths_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        remove_dir_all(&dir.path().join("nope")).await.unwrap();
        assert!(!remove_file(&dir.path().join("nope.js")).await.unwrap());
    }

    #[tokio::test]
    async fn remove_file_reports_removal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "x").unwrap();
        assert!(remove_file(&file).await.unwrap());
        assert!(!file.exists());
    }
}
