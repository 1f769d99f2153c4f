//! Source map preparation for upload.
//!
//! Reads a source map, stamps the debug id into it under both `debug_id` and
//! `debugId`, runs every `sources` entry through the rewrite hook and writes the
//! result to the staging directory.

use crate::debug_id::error::{Error, Result};
use crate::debug_id::rewrite::{RewriteSources, rewrite_sources};
use serde_json::Value;
use std::path::Path;

/// Stamps `debug_id` into a parsed source map and rewrites its sources.
///
/// Fails with [`Error::MapParse`] if the document is not a JSON object.
pub fn inject_debug_id(
    map: &mut Value,
    debug_id: &str,
    rewrite_hook: &dyn RewriteSources,
    map_path: &Path,
) -> Result<()> {
    let Some(object) = map.as_object_mut() else {
        return Err(Error::MapParse {
            path: map_path.to_path_buf(),
            reason: "source map is not a JSON object".to_string(),
        });
    };

    object.insert("debug_id".to_string(), Value::String(debug_id.to_string()));
    object.insert("debugId".to_string(), Value::String(debug_id.to_string()));

    rewrite_sources(map, rewrite_hook);
    Ok(())
}

/// Reads the map at `source_map_path`, transforms it and writes it to
/// `target_path`.
///
/// Nothing is written unless reading and parsing both succeed.
pub async fn prepare_source_map(
    source_map_path: &Path,
    target_path: &Path,
    debug_id: &str,
    rewrite_hook: &dyn RewriteSources,
) -> Result<()> {
    let content = tokio::fs::read_to_string(source_map_path)
        .await
        .map_err(|source| Error::MapRead {
            path: source_map_path.to_path_buf(),
            source,
        })?;

    let mut map: Value = serde_json::from_str(&content).map_err(|e| Error::MapParse {
        path: source_map_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    inject_debug_id(&mut map, debug_id, rewrite_hook, source_map_path)?;

    let serialized = serde_json::to_string(&map).map_err(|e| Error::MapParse {
        path: source_map_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    tokio::fs::write(target_path, serialized)
        .await
        .map_err(|source| Error::MapWrite {
            path: target_path.to_path_buf(),
            source,
        })?;

    log::debug!(
        "Staged source map {} -> {}",
        source_map_path.display(),
        target_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_id::rewrite::DefaultRewriteSources;
    use serde_json::json;

    const ID: &str = "5ad4a9b3-a39c-4d7e-9bb4-2a7a0e8d5f11";

    #[test]
    fn writes_both_id_fields() {
        let mut map = json!({ "version": 3, "sources": [], "mappings": "" });
        let hook = DefaultRewriteSources::with_base("/work");
        inject_debug_id(&mut map, ID, &hook, Path::new("a.map")).unwrap();
        assert_eq!(map["debug_id"], ID);
        assert_eq!(map["debugId"], ID);
    }

    #[test]
    fn overwrites_stale_ids() {
        let mut map = json!({ "debug_id": "old", "debugId": "old" });
        let hook = DefaultRewriteSources::with_base("/work");
        inject_debug_id(&mut map, ID, &hook, Path::new("a.map")).unwrap();
        assert_eq!(map["debug_id"], ID);
        assert_eq!(map["debugId"], ID);
    }

    #[test]
    fn non_object_document_is_parse_error() {
        let mut map = json!([1, 2, 3]);
        let hook = DefaultRewriteSources::with_base("/work");
        let err = inject_debug_id(&mut map, ID, &hook, Path::new("a.map")).unwrap_err();
        assert!(matches!(err, Error::MapParse { .. }));
    }

    #[tokio::test]
    async fn rewrites_sources_through_hook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.js.map");
        let output = dir.path().join("out.js.map");
        std::fs::write(
            &input,
            r#"{"version":3,"sources":["webpack://app/a.js","b.js","c.js"],"names":[],"mappings":"AAAA"}"#,
        )
        .unwrap();

        let seen = std::sync::Mutex::new(Vec::new());
        let hook = |source: &str, _: &Value| {
            seen.lock().unwrap().push(source.to_string());
            format!("rewritten/{source}")
        };
        prepare_source_map(&input, &output, ID, &hook).await.unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            written["sources"],
            json!(["rewritten/webpack://app/a.js", "rewritten/b.js", "rewritten/c.js"])
        );
        assert_eq!(written["mappings"], "AAAA");
        assert_eq!(written["debugId"], ID);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn invalid_json_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.js.map");
        let output = dir.path().join("out.js.map");
        std::fs::write(&input, "{ not json").unwrap();

        let hook = DefaultRewriteSources::with_base("/work");
        let err = prepare_source_map(&input, &output, ID, &hook).await.unwrap_err();
        assert!(matches!(err, Error::MapParse { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn missing_map_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let hook = DefaultRewriteSources::with_base("/work");
        let err = prepare_source_map(
            &dir.path().join("nope.map"),
            &dir.path().join("out.map"),
            ID,
            &hook,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::MapRead { .. }));
    }

    #[tokio::test]
    async fn unwritable_target_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.js.map");
        std::fs::write(&input, r#"{"version":3,"sources":[]}"#).unwrap();

        let hook = DefaultRewriteSources::with_base("/work");
        let target = dir.path().join("missing-dir").join("out.js.map");
        let err = prepare_source_map(&input, &target, ID, &hook).await.unwrap_err();
        assert!(matches!(err, Error::MapWrite { .. }));
    }
}
