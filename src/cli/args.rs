//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! and merging of the optional configuration file.

use crate::config::FileConfig;
use crate::debug_id::{SentryCliOptions, UploadSettingsBuilder};
use clap::Parser;
use std::path::PathBuf;

/// Stage debug-id stamped bundles and their source maps for upload
#[derive(Parser, Debug)]
#[command(
    name = "debug_id_upload",
    version,
    about = "Stage debug-id stamped bundles and their source maps for upload",
    long_about = "Finds built .js/.mjs/.cjs bundles that carry an embedded `sentry-dbid-<uuid>` marker,
pairs each with its source map, injects the debug id into the map, rewrites the map's
source paths, and uploads everything as one artifact bundle through sentry-cli.

Usage:
  debug_id_upload --release 1.4.0 'dist/**/*.js'
  debug_id_upload --include 'build/**' --ignore 'build/vendor/**' --dist web
  debug_id_upload --config debug-id-upload.toml --delete-after-upload 'dist/**/*.map'

Files without a debug id, unreadable files and broken source maps are skipped and
logged; they never stop the rest of the batch."
)]
pub struct Args {
    /// Build artifact paths or globs, used when no include patterns are configured
    #[arg(value_name = "ARTIFACT")]
    pub artifacts: Vec<String>,

    /// Include pattern, repeatable; pass the flag with no value to upload nothing
    #[arg(long, num_args = 0..=1, action = clap::ArgAction::Append, value_name = "PATTERN")]
    pub include: Option<Vec<String>>,

    /// Patterns excluded from the upload
    #[arg(long, value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Release name
    #[arg(long, env = "SENTRY_RELEASE")]
    pub release: Option<String>,

    /// Distribution label
    #[arg(long, env = "SENTRY_DIST")]
    pub dist: Option<String>,

    /// Patterns of files to delete after the upload
    #[arg(long = "delete-after-upload", value_name = "PATTERN")]
    pub delete_after_upload: Vec<String>,

    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server URL
    #[arg(long, env = "SENTRY_URL")]
    pub url: Option<String>,

    /// Auth token
    #[arg(long, env = "SENTRY_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Organization slug
    #[arg(long, env = "SENTRY_ORG")]
    pub org: Option<String>,

    /// Project slug
    #[arg(long, env = "SENTRY_PROJECT")]
    pub project: Option<String>,

    /// VCS remote name
    #[arg(long, env = "SENTRY_VCS_REMOTE")]
    pub vcs_remote: Option<String>,

    /// Extra HTTP header for the upload client, `Name: value`
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Path to the sentry-cli executable
    #[arg(long = "sentry-cli", value_name = "PATH")]
    pub sentry_cli: Option<PathBuf>,

    /// Do nothing
    #[arg(long)]
    pub disable: bool,

    /// Do not report batch failures to telemetry
    #[arg(long)]
    pub no_telemetry: bool,

    /// Exit with a non-zero status when the batch fails
    #[arg(long)]
    pub strict: bool,

    /// Debug logging for this tool and the upload client
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(header) = self.headers.iter().find(|h| !h.contains(':')) {
            return Err(format!(
                "Invalid header: {}. Headers must look like `Name: value`",
                header
            ));
        }

        if let Some(pattern) = self
            .include
            .iter()
            .flatten()
            .chain(&self.ignore)
            .find(|p| p.trim().is_empty())
        {
            return Err(format!("Invalid pattern: {:?}. Patterns cannot be blank", pattern));
        }

        Ok(())
    }
}

/// Settings resolved from flags, environment and the configuration file
pub struct RuntimeConfig {
    pub settings: UploadSettingsBuilder,
    pub upload: SentryCliOptions,
    pub telemetry: bool,
    pub strict: bool,
}

impl RuntimeConfig {
    /// Merges `args` over `file`. Flags and environment win.
    pub fn resolve(args: Args, file: FileConfig) -> Self {
        let mut settings = UploadSettingsBuilder::new();

        let include = args
            .include
            .or_else(|| file.include.map(|p| p.into_vec()));
        if let Some(include) = include {
            settings = settings.include(include);
        }

        let ignore = if args.ignore.is_empty() {
            file.ignore.map(|p| p.into_vec()).unwrap_or_default()
        } else {
            args.ignore
        };
        settings = settings.ignore(ignore);

        if let Some(release) = args.release.or(file.release) {
            settings = settings.release(release);
        }
        if let Some(dist) = args.dist.or(file.dist) {
            settings = settings.dist(dist);
        }

        let delete = if args.delete_after_upload.is_empty() {
            file.files_to_delete_after_upload.map(|p| p.into_vec())
        } else {
            Some(args.delete_after_upload)
        };
        if let Some(delete) = delete {
            settings = settings.files_to_delete_after_upload(delete);
        }

        settings = settings.disabled(args.disable || file.disable.unwrap_or(false));

        let headers = if args.headers.is_empty() {
            file.upload.header_lines()
        } else {
            args.headers
        };

        let upload = SentryCliOptions {
            url: args.url.or(file.upload.url),
            auth_token: args.auth_token.or(file.upload.auth_token),
            org: args.org.or(file.upload.org),
            project: args.project.or(file.upload.project),
            vcs_remote: args.vcs_remote.or(file.upload.vcs_remote),
            verbose: args.verbose,
            headers,
            cli_path: args.sentry_cli.or(file.upload.cli_path),
        };

        Self {
            settings,
            upload,
            telemetry: !args.no_telemetry && file.telemetry.unwrap_or(true),
            strict: args.strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Patterns;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("debug_id_upload").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn include_without_values_is_explicit_empty() {
        let args = parse(&["--include"]);
        assert_eq!(args.include, Some(vec![]));
    }

    #[test]
    fn include_takes_one_value_per_flag() {
        let args = parse(&["--include", "build/**", "--include", "lib/*.js", "dist/a.js"]);
        assert_eq!(
            args.include,
            Some(vec!["build/**".to_string(), "lib/*.js".to_string()])
        );
        assert_eq!(args.artifacts, vec!["dist/a.js"]);
    }

    #[test]
    fn include_absent_is_none() {
        let args = parse(&["dist/a.js"]);
        assert_eq!(args.include, None);
        assert_eq!(args.artifacts, vec!["dist/a.js"]);
    }

    #[test]
    fn rejects_malformed_header() {
        let args = parse(&["--header", "no-colon"]);
        assert!(args.validate().is_err());
        let args = parse(&["--header", "X-Trace: 1"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn flags_override_file() {
        let args = parse(&["--release", "cli", "--org", "cli-org"]);
        let file = FileConfig {
            release: Some("file".into()),
            dist: Some("file-dist".into()),
            ignore: Some(Patterns::One("vendor/**".into())),
            ..Default::default()
        };
        let mut file = file;
        file.upload.org = Some("file-org".into());
        file.upload.project = Some("file-project".into());

        let runtime = RuntimeConfig::resolve(args, file);
        let settings = runtime.settings.base_dir("/work").build().unwrap();
        assert_eq!(settings.release(), Some("cli"));
        assert_eq!(settings.dist(), Some("file-dist"));
        assert_eq!(settings.ignore(), ["vendor/**".to_string()]);
        assert_eq!(runtime.upload.org.as_deref(), Some("cli-org"));
        assert_eq!(runtime.upload.project.as_deref(), Some("file-project"));
        assert!(runtime.telemetry);
    }

    #[test]
    fn telemetry_off_from_either_side() {
        let runtime = RuntimeConfig::resolve(parse(&["--no-telemetry"]), FileConfig::default());
        assert!(!runtime.telemetry);

        let file = FileConfig {
            telemetry: Some(false),
            ..Default::default()
        };
        let runtime = RuntimeConfig::resolve(parse(&[]), file);
        assert!(!runtime.telemetry);
    }
}
