//! Debug id staging and upload pipeline.
//!
//! Takes freshly built script bundles that carry an embedded debug id, pairs
//! each one with its source map, stamps the id into the map, rewrites the map's
//! source paths, stages everything under `<debug_id>-<chunk_index>` names and
//! hands the staging directory to an [`Uploader`].
//!
//! # Overview
//!
//! [`DebugIdUpload::run`]:
//! 1. Creates a staging directory ([`StagingDir`])
//! 2. Resolves candidate script files from include/ignore globs
//! 3. Prepares every candidate concurrently ([`prepare::prepare_bundle`]):
//!    - extracts the `sentry-dbid-<uuid>` marker ([`extract`])
//!    - appends `//# debugId=<uuid>` and stages the bundle
//!    - locates the source map ([`locate`]) and stages a transformed copy
//!      ([`transform`], [`rewrite`])
//! 4. Uploads the staging directory once
//! 5. Optionally deletes files matching the post-upload delete patterns
//! 6. Removes the staging directory, whatever happened before
//!
//! A failure in one file never affects another. A failure in a stage is
//! reported through [`Telemetry`] and the recoverable-error handler.
//!
//! # Module Organization
//!
//! - [`discovery`] - glob expansion of candidate files
//! - [`extract`] - debug id extraction
//! - [`locate`] - source map path resolution
//! - [`rewrite`] - `sources` rewrite hooks
//! - [`transform`] - source map transformation
//! - [`prepare`] - per-bundle preparation
//! - [`orchestrator`] - batch orchestration
//! - [`staging`] - staging directory guard
//! - [`upload`] - uploader seam and the `sentry-cli` implementation
//! - [`telemetry`] - error telemetry seam

pub mod discovery;
pub mod error;
pub mod extract;
pub mod locate;
pub mod orchestrator;
pub mod prepare;
pub mod rewrite;
pub mod settings;
pub mod staging;
pub mod telemetry;
pub mod transform;
pub mod upload;
pub mod utils;

pub use error::{Error, ErrorExt, Result};
pub use orchestrator::{BatchReport, DebugIdUpload, RecoverableErrorHandler};
pub use prepare::{PrepareOutcome, SkipReason, StagedBundle};
pub use rewrite::{DefaultRewriteSources, RewriteSources};
pub use settings::{UploadSettings, UploadSettingsBuilder};
pub use staging::StagingDir;
pub use telemetry::{LogTelemetry, NoopTelemetry, Telemetry};
pub use upload::{
    PLACEHOLDER_RELEASE, SentryCliOptions, SentryCliUploader, UploadInclude, UploadRequest,
    Uploader,
};
