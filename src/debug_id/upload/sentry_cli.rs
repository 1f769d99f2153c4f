//! Uploader backed by the `sentry-cli` executable.

use super::{UploadRequest, Uploader};
use crate::debug_id::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

const SENTRY_CLI: &str = "sentry-cli";

/// Connection parameters for `sentry-cli`.
#[derive(Debug, Clone, Default)]
pub struct SentryCliOptions {
    /// Server URL (`--url`), defaults to whatever sentry-cli is configured with
    pub url: Option<String>,
    /// Passed via `SENTRY_AUTH_TOKEN` so it never shows up in the process list
    pub auth_token: Option<String>,
    pub org: Option<String>,
    pub project: Option<String>,
    /// Passed via `SENTRY_VCS_REMOTE`
    pub vcs_remote: Option<String>,
    /// Raise sentry-cli's log level to debug
    pub verbose: bool,
    /// Extra HTTP headers, each `Name: value`
    pub headers: Vec<String>,
    /// Explicit executable path; `PATH` is searched when unset
    pub cli_path: Option<PathBuf>,
}

/// Uploads staged artifact bundles by running `sentry-cli sourcemaps upload`.
#[derive(Debug, Clone)]
pub struct SentryCliUploader {
    options: SentryCliOptions,
}

impl SentryCliUploader {
    pub fn new(options: SentryCliOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SentryCliOptions {
        &self.options
    }

    /// Builds the argument list for one upload.
    pub fn build_args(&self, request: &UploadRequest) -> Vec<String> {
        let mut args = Vec::new();

        // Global options go before the subcommand
        if let Some(url) = &self.options.url {
            args.push("--url".to_string());
            args.push(url.clone());
        }
        for header in &self.options.headers {
            args.push("--header".to_string());
            args.push(header.clone());
        }
        if self.options.verbose {
            args.push("--log-level".to_string());
            args.push("debug".to_string());
        }

        args.push("sourcemaps".to_string());
        args.push("upload".to_string());

        if let Some(org) = &self.options.org {
            args.push("--org".to_string());
            args.push(org.clone());
        }
        if let Some(project) = &self.options.project {
            args.push("--project".to_string());
            args.push(project.clone());
        }

        args.push("--release".to_string());
        args.push(request.release.clone());

        if let Some(dist) = &request.include.dist {
            args.push("--dist".to_string());
            args.push(dist.clone());
        }
        if !request.include.rewrite {
            args.push("--no-rewrite".to_string());
        }

        for path in &request.include.paths {
            args.push(path.display().to_string());
        }

        args
    }

    fn executable(&self) -> Result<PathBuf> {
        if let Some(path) = &self.options.cli_path {
            return Ok(path.clone());
        }
        which::which(SENTRY_CLI).map_err(|e| Error::UploaderNotFound {
            name: SENTRY_CLI.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Uploader for SentryCliUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<()> {
        let executable = self.executable()?;
        let args = self.build_args(request);
        log::debug!("Running {} {}", executable.display(), args.join(" "));

        let mut command = Command::new(&executable);
        command
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(token) = &self.options.auth_token {
            command.env("SENTRY_AUTH_TOKEN", token);
        }
        if let Some(remote) = &self.options.vcs_remote {
            command.env("SENTRY_VCS_REMOTE", remote);
        }

        let mut child = command.spawn().map_err(|e| Error::UploadFailed {
            command: format!("{} {}", executable.display(), args.join(" ")),
            reason: e.to_string(),
        })?;

        // Drain both pipes before waiting so a chatty client cannot block on a full pipe
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (_, stderr_lines) = tokio::join!(
            async move {
                if let Some(stdout) = stdout {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log::info!("{}", line);
                    }
                }
            },
            async move {
                let mut captured = Vec::new();
                if let Some(stderr) = stderr {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log::debug!("{}", line);
                        captured.push(line);
                    }
                }
                captured
            }
        );

        let status = child.wait().await?;
        if !status.success() {
            return Err(Error::UploadFailed {
                command: format!("{} sourcemaps upload", SENTRY_CLI),
                reason: format!("exited with {}: {}", status, stderr_lines.join("\n")),
            });
        }

        log::info!("Uploaded artifact bundle for release {}", request.release);
        Ok(())
    }
}
