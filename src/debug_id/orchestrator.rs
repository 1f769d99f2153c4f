//! Batch orchestration: discover, prepare, upload, delete, clean up.
//!
//! This module provides the [`DebugIdUpload`] orchestrator that drives one
//! batch through its stages:
//!
//! ```text
//! stage dir created -> discover -> prepare all -> upload -> delete sources -> cleanup
//! ```
//!
//! Any error escaping a stage ends the batch early. It is captured once by
//! telemetry, handed to the recoverable-error handler, and the staging
//! directory is still removed.

use crate::debug_id::discovery::{discover_candidates, glob_files};
use crate::debug_id::error::{Error, Result};
use crate::debug_id::prepare::{PrepareOutcome, StagedBundle, prepare_bundle};
use crate::debug_id::settings::UploadSettings;
use crate::debug_id::staging::StagingDir;
use crate::debug_id::telemetry::{LogTelemetry, Telemetry};
use crate::debug_id::upload::{UploadRequest, Uploader};
use crate::debug_id::utils::fs;
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

/// Callback for batch failures. What it does with the error is up to the caller.
pub type RecoverableErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// Summary of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of script files discovery produced
    pub candidates: usize,
    /// Bundles that reached the staging directory
    pub staged: Vec<StagedBundle>,
    /// Candidates that were unreadable or had no debug id
    pub skipped: usize,
    /// Whether the uploader was invoked and succeeded
    pub uploaded: bool,
    /// Files removed after upload
    pub deleted: usize,
    /// Whether a batch-level error ended the run
    pub failed: bool,
}

/// Debug id upload orchestrator.
///
/// # Examples
///
/// ```no_run
/// use debug_id_upload::debug_id::{
///     DebugIdUpload, SentryCliOptions, SentryCliUploader, UploadSettingsBuilder,
/// };
///
/// # async fn example() -> debug_id_upload::debug_id::Result<()> {
/// let settings = UploadSettingsBuilder::new()
///     .include(vec!["dist/**/*".into()])
///     .release("1.4.0")
///     .build()?;
/// let uploader = SentryCliUploader::new(SentryCliOptions::default());
///
/// let report = DebugIdUpload::new(settings, uploader).run(&[]).await;
/// println!("staged {} bundles", report.staged.len());
/// # Ok(())
/// # }
/// ```
pub struct DebugIdUpload {
    settings: UploadSettings,
    uploader: Arc<dyn Uploader>,
    telemetry: Arc<dyn Telemetry>,
    handle_recoverable_error: RecoverableErrorHandler,
}

impl std::fmt::Debug for DebugIdUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugIdUpload")
            .field("settings", &self.settings)
            .field("uploader", &"<Uploader>")
            .field("telemetry", &"<Telemetry>")
            .finish()
    }
}

impl DebugIdUpload {
    /// Creates an orchestrator that reports through [`LogTelemetry`] and logs
    /// recoverable errors.
    pub fn new<U: Uploader + 'static>(settings: UploadSettings, uploader: U) -> Self {
        Self {
            settings,
            uploader: Arc::new(uploader),
            telemetry: Arc::new(LogTelemetry),
            handle_recoverable_error: Arc::new(|err: &Error| {
                log::error!("Debug ID upload failed: {}", err);
            }),
        }
    }

    /// Replaces the telemetry sink.
    pub fn with_telemetry<T: Telemetry + 'static>(mut self, telemetry: T) -> Self {
        self.telemetry = Arc::new(telemetry);
        self
    }

    /// Replaces the recoverable-error handler.
    pub fn with_recoverable_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.handle_recoverable_error = Arc::new(handler);
        self
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Runs one batch.
    ///
    /// `build_artifact_paths` are the outputs reported by the build tool. They
    /// are only used when no include patterns are configured, and may be globs.
    ///
    /// Never returns an error: batch failures are reported through telemetry
    /// and the recoverable-error handler, and show up as
    /// [`BatchReport::failed`].
    pub async fn run(&self, build_artifact_paths: &[String]) -> BatchReport {
        let mut report = BatchReport::default();

        if self.settings.is_disabled() {
            log::debug!("Debug ID upload is disabled, nothing to do");
            return report;
        }

        let staging = match self.settings.staging_parent() {
            Some(parent) => StagingDir::create_in(parent).await,
            None => StagingDir::create().await,
        };

        let result = match staging {
            Ok(staging) => {
                let result = self
                    .run_stages(&staging, build_artifact_paths, &mut report)
                    .await;
                // Every write into the directory has settled at this point
                staging.cleanup().await;
                result
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            report.failed = true;
            self.telemetry
                .capture_exception("Error in debug ID upload batch");
            self.telemetry.flush().await;
            (self.handle_recoverable_error)(&e);
        }

        report
    }

    async fn run_stages(
        &self,
        staging: &StagingDir,
        build_artifact_paths: &[String],
        report: &mut BatchReport,
    ) -> Result<()> {
        let explicit_empty = self.settings.include().is_some_and(|i| i.is_empty());
        let candidates = self.discover(build_artifact_paths).await?;
        report.candidates = candidates.len();

        if explicit_empty {
            log::debug!("Empty include list provided. Will not upload source maps with debug ID.");
        } else if candidates.is_empty() {
            log::warn!(
                "Didn't find any matching sources for debug ID upload. Please check the include patterns."
            );
        } else {
            log::info!("Preparing {} bundle(s) for debug ID upload", candidates.len());
            self.prepare_all(&candidates, staging, report).await?;

            let request = UploadRequest::for_staging_dir(
                staging.path().to_path_buf(),
                self.settings.release(),
                self.settings.dist(),
            );
            log::info!(
                "Uploading {} staged bundle(s) for release {}",
                report.staged.len(),
                request.release
            );
            self.uploader.upload(&request).await?;
            report.uploaded = true;
        }

        if let Some(patterns) = self.settings.files_to_delete_after_upload() {
            report.deleted = self.delete_files(patterns).await?;
        }

        Ok(())
    }

    async fn discover(&self, build_artifact_paths: &[String]) -> Result<Vec<PathBuf>> {
        let include = match self.settings.include() {
            Some([]) => return Ok(Vec::new()),
            Some(include) => include,
            None => {
                log::debug!(
                    "No include patterns provided, falling back to detected build artifacts."
                );
                build_artifact_paths
            }
        };

        discover_candidates(include, self.settings.ignore(), self.settings.base_dir()).await
    }

    /// Prepares every candidate. A panic in one preparation (a user rewrite
    /// hook, say) is held until all the others have settled and is then
    /// returned as a batch error.
    async fn prepare_all(
        &self,
        candidates: &[PathBuf],
        staging: &StagingDir,
        report: &mut BatchReport,
    ) -> Result<()> {
        let hook = self.settings.rewrite_sources();
        let outcomes = join_all(candidates.iter().enumerate().map(|(chunk_index, path)| {
            AssertUnwindSafe(prepare_bundle(path, chunk_index, staging, hook)).catch_unwind()
        }))
        .await;

        let mut panicked = None;
        for (path, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Ok(PrepareOutcome::Staged(staged)) => report.staged.push(staged),
                Ok(PrepareOutcome::Skipped { .. }) => report.skipped += 1,
                Err(payload) => {
                    if panicked.is_none() {
                        panicked = Some(format!(
                            "Preparing {} panicked: {}",
                            path.display(),
                            panic_message(&*payload)
                        ));
                    }
                }
            }
        }

        match panicked {
            Some(message) => Err(Error::GenericError(message)),
            None => Ok(()),
        }
    }

    async fn delete_files(&self, patterns: &[String]) -> Result<usize> {
        let paths = glob_files(patterns, &[], self.settings.base_dir()).await?;

        let results = join_all(paths.iter().map(|path| async move {
            log::debug!("Deleting asset after upload: {}", path.display());
            fs::remove_file(path).await
        }))
        .await;

        let mut deleted = 0;
        for result in results {
            match result {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => log::warn!("{}", e),
            }
        }
        Ok(deleted)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
