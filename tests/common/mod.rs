//! Shared fakes and fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use debug_id_upload::debug_id::{Error, Result, Telemetry, UploadRequest, Uploader};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const ID_A: &str = "5ad4a9b3-a39c-4d7e-9bb4-2a7a0e8d5f11";
pub const ID_B: &str = "0f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a";

/// What the uploader saw when it was called
#[derive(Debug, Clone)]
pub struct UploadCall {
    pub request: UploadRequest,
    /// File name -> contents of every file in the staging directory
    pub files: BTreeMap<String, String>,
}

/// Uploader that snapshots the staging directory instead of uploading it
#[derive(Debug, Clone, Default)]
pub struct RecordingUploader {
    calls: Arc<Mutex<Vec<UploadCall>>>,
    fail_with: Option<String>,
}

impl RecordingUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots like `new`, then reports failure
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Arc::default(),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<UploadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn staging_dir(&self) -> Option<PathBuf> {
        self.calls()
            .first()
            .and_then(|c| c.request.include.paths.first().cloned())
    }
}

#[async_trait]
impl Uploader for RecordingUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<()> {
        let mut files = BTreeMap::new();
        for path in &request.include.paths {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                files.insert(name, std::fs::read_to_string(entry.path())?);
            }
        }
        self.calls.lock().unwrap().push(UploadCall {
            request: request.clone(),
            files,
        });

        match &self.fail_with {
            Some(reason) => Err(Error::UploadFailed {
                command: "fake upload".to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Telemetry sink that remembers captured messages and flushes
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    pub captured: Arc<Mutex<Vec<String>>>,
    pub flushes: Arc<Mutex<usize>>,
}

#[async_trait]
impl Telemetry for RecordingTelemetry {
    fn capture_exception(&self, message: &str) {
        self.captured.lock().unwrap().push(message.to_string());
    }

    async fn flush(&self) {
        *self.flushes.lock().unwrap() += 1;
    }
}

/// Writes a bundle carrying `debug_id` plus optional trailing text
pub fn write_bundle(dir: &Path, rel: &str, debug_id: &str, trailer: &str) -> PathBuf {
    let body = format!(
        "!function(){{try{{var e=\"undefined\"!=typeof window?window:{{}};e._sentryDebugIdIdentifier=\"sentry-dbid-{debug_id}\"}}catch(e){{}}}}();\nconsole.log(\"{rel}\");\n{trailer}"
    );
    write_file(dir, rel, &body)
}

pub fn write_file(dir: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Lists directories under `parent` whose name marks them as staging dirs
pub fn staging_dirs_in(parent: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(parent)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("debug-id-upload-"))
        })
        .collect()
}
