//! Source map discovery for a bundle.
//!
//! Resolution order, first hit wins:
//!
//! 1. The last `//# sourceMappingURL=<value>` comment line in the bundle text.
//!    Absolute values are used as-is, relative ones are joined onto the
//!    bundle's directory. `file://` URLs are converted to paths; `data:` and
//!    other remote URLs cannot name a local file and are ignored.
//! 2. A sibling file at `<bundle path>.map`, if it exists.
//!
//! Nothing here opens the map; only the path is resolved.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use sugar_path::SugarPath;

static SOURCE_MAPPING_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*//# sourceMappingURL=(.*)$").unwrap());

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Resolves the source map path for `bundle_path`, or `None` if there is none.
pub async fn source_map_path_for_bundle(
    bundle_path: &Path,
    bundle_source: &str,
) -> Option<PathBuf> {
    if let Some(path) = source_mapping_url_path(bundle_path, bundle_source) {
        return Some(path);
    }

    let mut adjacent = bundle_path.as_os_str().to_owned();
    adjacent.push(".map");
    let adjacent = PathBuf::from(adjacent);
    if tokio::fs::try_exists(&adjacent).await.unwrap_or(false) {
        return Some(adjacent);
    }

    log::debug!(
        "Could not determine source map path for bundle: {}. No sourceMappingURL comment and no adjacent .map file.",
        bundle_path.display()
    );
    None
}

/// Resolves the path named by the bundle's trailing `sourceMappingURL` comment.
fn source_mapping_url_path(bundle_path: &Path, bundle_source: &str) -> Option<PathBuf> {
    let value = SOURCE_MAPPING_URL
        .captures_iter(bundle_source)
        .filter_map(|caps| caps.get(1))
        .last()?
        .as_str()
        .trim();

    if value.is_empty() {
        return None;
    }

    if URL_SCHEME.is_match(value) && !looks_like_windows_drive(value) {
        return match url::Url::parse(value) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
            _ => {
                log::debug!(
                    "Ignoring non-file sourceMappingURL in {}: {}",
                    bundle_path.display(),
                    truncate(value)
                );
                None
            }
        };
    }

    let value = Path::new(value);
    if value.is_absolute() {
        Some(value.normalize())
    } else {
        let dir = bundle_path.parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(value).normalize())
    }
}

fn looks_like_windows_drive(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

// Inline data URLs can be megabytes long.
fn truncate(value: &str) -> &str {
    match value.char_indices().nth(64) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
