//! Builder for constructing UploadSettings.

use super::UploadSettings;
use crate::debug_id::error::{ErrorExt, Result};
use crate::debug_id::rewrite::{DefaultRewriteSources, RewriteSources};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builder for constructing [`UploadSettings`].
///
/// Provides a fluent API for building batch settings.
///
/// # Examples
///
/// ```no_run
/// use debug_id_upload::debug_id::UploadSettingsBuilder;
///
/// # fn example() -> debug_id_upload::debug_id::Result<()> {
/// let settings = UploadSettingsBuilder::new()
///     .include(vec!["dist/**/*.js".into()])
///     .ignore(vec!["dist/vendor/**".into()])
///     .release("1.4.0")
///     .dist("web")
///     .files_to_delete_after_upload(vec!["dist/**/*.map".into()])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct UploadSettingsBuilder {
    include: Option<Vec<String>>,
    ignore: Vec<String>,
    release: Option<String>,
    dist: Option<String>,
    files_to_delete_after_upload: Option<Vec<String>>,
    rewrite_sources: Option<Arc<dyn RewriteSources>>,
    base_dir: Option<PathBuf>,
    staging_parent: Option<PathBuf>,
    disabled: bool,
}

impl UploadSettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the include patterns.
    ///
    /// An empty list disables discovery entirely. When never called, the
    /// build artifact paths handed to `run` are used instead.
    pub fn include(mut self, patterns: Vec<String>) -> Self {
        self.include = Some(patterns);
        self
    }

    /// Sets patterns whose matches are never prepared.
    ///
    /// Default: none
    pub fn ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = patterns;
        self
    }

    /// Sets the release name.
    ///
    /// Default: the `"undefined"` placeholder
    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Sets the distribution label.
    pub fn dist(mut self, dist: impl Into<String>) -> Self {
        self.dist = Some(dist.into());
        self
    }

    /// Sets patterns of files to delete once the upload has run.
    pub fn files_to_delete_after_upload(mut self, patterns: Vec<String>) -> Self {
        self.files_to_delete_after_upload = Some(patterns);
        self
    }

    /// Replaces the source path rewrite hook.
    ///
    /// Default: [`DefaultRewriteSources`] anchored at the base directory
    pub fn rewrite_sources<R: RewriteSources + 'static>(mut self, hook: R) -> Self {
        self.rewrite_sources = Some(Arc::new(hook));
        self
    }

    /// Sets the directory relative patterns are resolved against.
    ///
    /// Default: current working directory
    pub fn base_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.base_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory the staging directory is created in.
    ///
    /// Default: system temp directory
    pub fn staging_parent<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_parent = Some(path.as_ref().to_path_buf());
        self
    }

    /// Turns the whole batch into a no-op.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Fails only if no base directory was set and the current working
    /// directory cannot be read.
    pub fn build(self) -> Result<UploadSettings> {
        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().fs_context("reading", Path::new("."))?,
        };

        let rewrite_sources = self
            .rewrite_sources
            .unwrap_or_else(|| Arc::new(DefaultRewriteSources::with_base(&base_dir)));

        Ok(UploadSettings::new(
            self.include,
            self.ignore,
            self.release,
            self.dist,
            self.files_to_delete_after_upload,
            rewrite_sources,
            base_dir,
            self.staging_parent,
            self.disabled,
        ))
    }
}
