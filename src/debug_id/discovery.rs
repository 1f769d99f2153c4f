//! Candidate discovery: glob expansion of include/ignore patterns.

use crate::debug_id::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use path_absolutize::Absolutize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extensions of files that can carry a debug id.
pub const SCRIPT_EXTENSIONS: [&str; 3] = ["js", "mjs", "cjs"];

/// Returns true for `.js`, `.mjs` and `.cjs` files.
pub fn is_script_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

/// Expands `include` patterns into the set of script files to prepare.
///
/// Relative patterns are anchored at `base`. Directories are dropped, as is
/// anything matched by an `ignore` pattern. The result is absolute, sorted and
/// free of duplicates.
pub async fn discover_candidates(
    include: &[String],
    ignore: &[String],
    base: &Path,
) -> Result<Vec<PathBuf>> {
    let files = glob_files(include, ignore, base).await?;
    Ok(files.into_iter().filter(|p| is_script_file(p)).collect())
}

/// Expands `patterns` into absolute file paths, minus `ignore` matches.
pub async fn glob_files(
    patterns: &[String],
    ignore: &[String],
    base: &Path,
) -> Result<Vec<PathBuf>> {
    let patterns: Vec<String> = patterns.iter().map(|p| anchor(p, base)).collect();
    let ignore = ignore
        .iter()
        .map(|p| {
            let anchored = anchor(p, base);
            Pattern::new(&anchored).map_err(|e| Error::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Directory walking is blocking work.
    tokio::task::spawn_blocking(move || {
        let mut files = BTreeSet::new();
        for pattern in &patterns {
            let entries = glob::glob(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            for entry in entries {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        log::debug!("Skipping unreadable glob match: {}", e);
                        continue;
                    }
                };
                if !path.is_file() {
                    continue;
                }
                let path = match path.absolutize() {
                    Ok(absolute) => absolute.into_owned(),
                    Err(_) => path,
                };
                if is_ignored(&path, &ignore) {
                    log::debug!("Ignoring {}", path.display());
                    continue;
                }
                files.insert(path);
            }
        }
        Ok::<Vec<PathBuf>, Error>(files.into_iter().collect())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Glob expansion task panicked: {}", e)))?
}

fn anchor(pattern: &str, base: &Path) -> String {
    if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = Pattern::escape(&base.to_string_lossy());
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
        format!("{}/{}", base.trim_end_matches('/'), pattern)
    }
}

fn is_ignored(path: &Path, ignore: &[Pattern]) -> bool {
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };
    ignore.iter().any(|p| p.matches_path_with(path, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "x").unwrap();
        path
    }

    #[test]
    fn script_extensions() {
        assert!(is_script_file(Path::new("a.js")));
        assert!(is_script_file(Path::new("a.mjs")));
        assert!(is_script_file(Path::new("a.cjs")));
        assert!(!is_script_file(Path::new("a.js.map")));
        assert!(!is_script_file(Path::new("a.css")));
        assert!(!is_script_file(Path::new("js")));
    }

    #[tokio::test]
    async fn filters_to_scripts_and_drops_directories() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "dist/a.js");
        let b = touch(dir.path(), "dist/nested/b.mjs");
        touch(dir.path(), "dist/a.js.map");
        touch(dir.path(), "dist/style.css");
        std::fs::create_dir_all(dir.path().join("dist/dir.js")).unwrap();

        let found = discover_candidates(&["dist/**/*".to_string()], &[], dir.path())
            .await
            .unwrap();
        assert_eq!(found, vec![a, b]);
    }

    #[tokio::test]
    async fn overlapping_patterns_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "dist/a.js");

        let found = discover_candidates(
            &["dist/*.js".to_string(), "./dist/a.js".to_string(), "dist/**/*.js".to_string()],
            &[],
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn ignore_patterns_exclude_matches() {
        let dir = tempfile::tempdir().unwrap();
        let keep = touch(dir.path(), "dist/app.js");
        touch(dir.path(), "dist/vendor/lib.js");

        let found = discover_candidates(
            &["dist/**/*.js".to_string()],
            &["dist/vendor/**".to_string()],
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(found, vec![keep]);
    }

    #[tokio::test]
    async fn no_matches_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let found = discover_candidates(&["build/**/*.js".to_string()], &[], dir.path())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn invalid_pattern_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_candidates(&["dist/[".to_string()], &[], dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
