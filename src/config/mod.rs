//! Optional TOML configuration file.
//!
//! ```toml
//! include = ["dist/**/*.js"]
//! ignore = "dist/vendor/**"
//! release = "1.4.0"
//! dist = "web"
//! files_to_delete_after_upload = ["dist/**/*.map"]
//! telemetry = false
//!
//! [upload]
//! org = "acme"
//! project = "web"
//! headers = { "X-Trace" = "1" }
//! ```
//!
//! Every key is optional. Command line flags and environment variables win
//! over the file.

use anyhow::Context;
use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A pattern setting that accepts either one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(pattern) => vec![pattern],
            Self::Many(patterns) => patterns,
        }
    }
}

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// `[]` opts out of uploading; absent means "use build artifacts"
    pub include: Option<Patterns>,
    pub ignore: Option<Patterns>,
    pub release: Option<String>,
    pub dist: Option<String>,
    pub files_to_delete_after_upload: Option<Patterns>,
    pub disable: Option<bool>,
    pub telemetry: Option<bool>,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// `[upload]` table: connection parameters for the upload client
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
    pub org: Option<String>,
    pub project: Option<String>,
    pub vcs_remote: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub cli_path: Option<PathBuf>,
}

impl UploadConfig {
    /// Headers in `Name: value` form.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect()
    }
}

/// Reads and parses a configuration file.
pub async fn load_config(path: &Path) -> Result<FileConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content, path)
}

fn parse_config(content: &str, path: &Path) -> Result<FileConfig> {
    toml::from_str(content).map_err(|source| AppError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
include = ["dist/**/*.js", "build/*.mjs"]
ignore = "dist/vendor/**"
release = "1.4.0"
dist = "web"
files_to_delete_after_upload = ["dist/**/*.map"]
disable = false
telemetry = false

[upload]
url = "https://sentry.example.com"
org = "acme"
project = "web"
vcs_remote = "upstream"
headers = { "X-Trace" = "1", "Authorization-Extra" = "x" }
"#,
            Path::new("debug-id-upload.toml"),
        )
        .unwrap();

        assert_eq!(
            config.include.unwrap().into_vec(),
            vec!["dist/**/*.js", "build/*.mjs"]
        );
        assert_eq!(config.ignore.unwrap().into_vec(), vec!["dist/vendor/**"]);
        assert_eq!(config.release.as_deref(), Some("1.4.0"));
        assert_eq!(config.telemetry, Some(false));
        assert_eq!(config.upload.org.as_deref(), Some("acme"));
        assert_eq!(
            config.upload.header_lines(),
            vec!["Authorization-Extra: x", "X-Trace: 1"]
        );
    }

    #[test]
    fn empty_include_list_is_preserved() {
        let config = parse_config("include = []", Path::new("c.toml")).unwrap();
        assert_eq!(config.include, Some(Patterns::Many(vec![])));
    }

    #[test]
    fn empty_file_is_default() {
        let config = parse_config("", Path::new("c.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config("includes = []", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }
}
