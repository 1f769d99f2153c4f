//! Core settings for a debug id upload batch.

use crate::debug_id::rewrite::RewriteSources;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for one [`DebugIdUpload`](crate::debug_id::DebugIdUpload) run.
///
/// Built with [`UploadSettingsBuilder`](super::UploadSettingsBuilder).
#[derive(Clone)]
pub struct UploadSettings {
    include: Option<Vec<String>>,
    ignore: Vec<String>,
    release: Option<String>,
    dist: Option<String>,
    files_to_delete_after_upload: Option<Vec<String>>,
    rewrite_sources: Arc<dyn RewriteSources>,
    base_dir: PathBuf,
    staging_parent: Option<PathBuf>,
    disabled: bool,
}

impl fmt::Debug for UploadSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSettings")
            .field("include", &self.include)
            .field("ignore", &self.ignore)
            .field("release", &self.release)
            .field("dist", &self.dist)
            .field(
                "files_to_delete_after_upload",
                &self.files_to_delete_after_upload,
            )
            .field("rewrite_sources", &"<hook>")
            .field("base_dir", &self.base_dir)
            .field("staging_parent", &self.staging_parent)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl UploadSettings {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        include: Option<Vec<String>>,
        ignore: Vec<String>,
        release: Option<String>,
        dist: Option<String>,
        files_to_delete_after_upload: Option<Vec<String>>,
        rewrite_sources: Arc<dyn RewriteSources>,
        base_dir: PathBuf,
        staging_parent: Option<PathBuf>,
        disabled: bool,
    ) -> Self {
        Self {
            include,
            ignore,
            release,
            dist,
            files_to_delete_after_upload,
            rewrite_sources,
            base_dir,
            staging_parent,
            disabled,
        }
    }

    /// Include patterns. `None` means "use the build artifact paths";
    /// `Some(empty)` means "upload nothing".
    pub fn include(&self) -> Option<&[String]> {
        self.include.as_deref()
    }

    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn dist(&self) -> Option<&str> {
        self.dist.as_deref()
    }

    pub fn files_to_delete_after_upload(&self) -> Option<&[String]> {
        self.files_to_delete_after_upload.as_deref()
    }

    pub fn rewrite_sources(&self) -> &dyn RewriteSources {
        self.rewrite_sources.as_ref()
    }

    /// Directory relative patterns are anchored at.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where the staging directory is created; the system temp dir when `None`.
    pub fn staging_parent(&self) -> Option<&Path> {
        self.staging_parent.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}
