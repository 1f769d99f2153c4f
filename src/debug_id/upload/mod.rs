//! Hand-off of the staging directory to an artifact upload client.
//!
//! The pipeline only knows the [`Uploader`] trait. [`SentryCliUploader`] is the
//! stock implementation and drives the external `sentry-cli` executable.

mod sentry_cli;

pub use sentry_cli::{SentryCliOptions, SentryCliUploader};

use crate::debug_id::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Release name sent when none is configured. Debug ids are the real matching
/// key; the release only drives legacy grouping.
pub const PLACEHOLDER_RELEASE: &str = "undefined";

/// One artifact-bundle upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub release: String,
    pub include: UploadInclude,
}

/// Which files go into the upload and how the client should treat them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInclude {
    pub paths: Vec<PathBuf>,
    /// Whether the client may rewrite maps itself. Always false for staged
    /// output, which is already rewritten.
    pub rewrite: bool,
    pub dist: Option<String>,
}

impl UploadRequest {
    /// Uploads the whole staging directory as one artifact bundle.
    pub fn for_staging_dir(
        staging_dir: PathBuf,
        release: Option<&str>,
        dist: Option<&str>,
    ) -> Self {
        Self {
            release: release.unwrap_or(PLACEHOLDER_RELEASE).to_string(),
            include: UploadInclude {
                paths: vec![staging_dir],
                rewrite: false,
                dist: dist.map(str::to_owned),
            },
        }
    }
}

/// External client that uploads artifact bundles.
///
/// Implementations own their retry, auth and timeout behaviour.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_release_uses_placeholder() {
        let request = UploadRequest::for_staging_dir(PathBuf::from("/tmp/s"), None, Some("web"));
        assert_eq!(request.release, "undefined");
        assert_eq!(request.include.paths, vec![PathBuf::from("/tmp/s")]);
        assert!(!request.include.rewrite);
        assert_eq!(request.include.dist.as_deref(), Some("web"));
    }

    #[test]
    fn configured_release_is_kept() {
        let request = UploadRequest::for_staging_dir(PathBuf::from("/tmp/s"), Some("1.2.3"), None);
        assert_eq!(request.release, "1.2.3");
        assert_eq!(request.include.dist, None);
    }
}
