//! Rewriting of the `sources` entries of a staged source map.
//!
//! A [`RewriteSources`] hook sees one entry at a time together with the whole
//! map document and returns the replacement entry. Any `Fn(&str, &Value) ->
//! String` closure is a hook.

use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use sugar_path::SugarPath;

static URI_SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap());

/// Maps one `sources` entry to the value that gets uploaded.
pub trait RewriteSources: Send + Sync {
    fn rewrite(&self, source: &str, map: &Value) -> String;
}

impl<F> RewriteSources for F
where
    F: Fn(&str, &Value) -> String + Send + Sync,
{
    fn rewrite(&self, source: &str, map: &Value) -> String {
        self(source, map)
    }
}

/// Strips URI schemes and makes local paths relative to a base directory.
///
/// - `webpack://app/src/a.ts` becomes `app/src/a.ts`
/// - `https://cdn.example.com/app.js` becomes `cdn.example.com/app.js`
/// - `/home/me/proj/src/a.ts` with base `/home/me/proj` becomes `src/a.ts`
///
/// Relative entries are normalized and resolved against the same base, so
/// `./src/../src/a.ts` becomes `src/a.ts`.
#[derive(Debug, Clone)]
pub struct DefaultRewriteSources {
    base: PathBuf,
}

impl DefaultRewriteSources {
    /// Uses the process's current working directory as the base.
    pub fn new() -> Self {
        let base = std::env::current_dir().unwrap_or_else(|e| {
            log::debug!("Could not read current directory, using `.`: {}", e);
            PathBuf::from(".")
        });
        Self { base }
    }

    /// Uses an explicit base directory instead of the working directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl Default for DefaultRewriteSources {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteSources for DefaultRewriteSources {
    fn rewrite(&self, source: &str, _map: &Value) -> String {
        if let Some(prefix) = URI_SCHEME_PREFIX.find(source) {
            return source[prefix.end()..].to_string();
        }

        let absolute = self.base.join(Path::new(source).normalize()).normalize();
        absolute.relative(&self.base).to_slash_lossy().into_owned()
    }
}

/// Applies `hook` to every string entry of `map["sources"]`, in place.
///
/// The array keeps its length and order. Non-string entries (`null` is legal in
/// source maps) are left as they are. Returns the number of rewritten entries.
pub fn rewrite_sources(map: &mut Value, hook: &dyn RewriteSources) -> usize {
    let Some(Value::Array(sources)) = map.get("sources") else {
        return 0;
    };

    let rewritten: Vec<Option<String>> = sources
        .iter()
        .map(|entry| entry.as_str().map(|s| hook.rewrite(s, map)))
        .collect();

    let mut count = 0;
    if let Some(Value::Array(sources)) = map.get_mut("sources") {
        for (entry, replacement) in sources.iter_mut().zip(rewritten) {
            if let Some(replacement) = replacement {
                *entry = Value::String(replacement);
                count += 1;
            }
        }
    }
    count
}
