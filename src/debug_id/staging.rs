//! Temporary staging directory for one upload batch.

use crate::debug_id::error::{Error, Result};
use crate::debug_id::utils::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STAGING_DIR_PREFIX: &str = "debug-id-upload-";

/// Owns the staging directory and removes it when the batch is done.
///
/// Call [`StagingDir::cleanup`] once every write into the directory has
/// settled. If the guard is dropped without that (panic, early return), `Drop`
/// removes the directory synchronously.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    cleaned: bool,
}

impl StagingDir {
    /// Creates a fresh, uniquely named directory under the system temp dir.
    pub async fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir()).await
    }

    /// Creates a fresh, uniquely named directory under `parent`.
    pub async fn create_in(parent: &Path) -> Result<Self> {
        let path = parent.join(format!("{}{}", STAGING_DIR_PREFIX, Uuid::new_v4()));
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| Error::StagingDir {
                path: path.clone(),
                source,
            })?;
        log::debug!("Created staging directory {}", path.display());
        Ok(Self {
            path,
            cleaned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a staged file named `<debug_id>-<chunk_index><extension>`.
    pub fn staged_file(&self, debug_id: &str, chunk_index: usize, extension: &str) -> PathBuf {
        self.path.join(format!("{}-{}{}", debug_id, chunk_index, extension))
    }

    /// Removes the directory and everything in it.
    ///
    /// Failures are logged, not returned: cleanup runs on every exit path and
    /// has nobody left to report to.
    pub async fn cleanup(mut self) {
        self.cleaned = true;
        match fs::remove_dir_all(&self.path).await {
            Ok(()) => log::debug!("Removed staging directory {}", self.path.display()),
            Err(e) => log::warn!(
                "Failed to clean up staging directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to clean up staging directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
