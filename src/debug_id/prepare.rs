//! Preparation of a single bundle for upload.

use crate::debug_id::error::Error;
use crate::debug_id::extract::debug_id_from_source;
use crate::debug_id::locate::source_map_path_for_bundle;
use crate::debug_id::rewrite::RewriteSources;
use crate::debug_id::staging::StagingDir;
use crate::debug_id::transform::prepare_source_map;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// The bundle (and possibly its map) were written to the staging directory.
    Staged(StagedBundle),
    /// The candidate produced no staged output.
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Staged output for one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBundle {
    pub source_path: PathBuf,
    pub debug_id: String,
    pub chunk_index: usize,
    /// `<staging>/<debug_id>-<chunk_index>.js`, `None` if that write failed
    pub bundle_path: Option<PathBuf>,
    /// `<staging>/<debug_id>-<chunk_index>.js.map`, `None` if no map was staged
    pub source_map_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable,
    NoDebugId,
}

/// Stages one candidate file.
///
/// Reads the bundle, extracts its debug id, appends a `//# debugId=` comment
/// and then, concurrently, writes the stamped bundle and runs the source map
/// pipeline. Every failure is logged here and reflected in the outcome; none
/// of them is returned.
pub async fn prepare_bundle(
    bundle_path: &Path,
    chunk_index: usize,
    staging: &StagingDir,
    rewrite_hook: &dyn RewriteSources,
) -> PrepareOutcome {
    let mut source = match tokio::fs::read_to_string(bundle_path).await {
        Ok(source) => source,
        Err(source) => {
            let err = Error::BundleRead {
                path: bundle_path.to_path_buf(),
                source,
            };
            log::error!("Could not read bundle for debug ID upload: {}", err);
            return PrepareOutcome::Skipped {
                path: bundle_path.to_path_buf(),
                reason: SkipReason::Unreadable,
            };
        }
    };

    let Some(debug_id) = debug_id_from_source(&source).map(str::to_owned) else {
        log::debug!(
            "Could not determine debug ID from bundle. This can happen if the output folder was not \
             cleaned before the debug ID build step ran. File will not be source mapped: {}",
            bundle_path.display()
        );
        return PrepareOutcome::Skipped {
            path: bundle_path.to_path_buf(),
            reason: SkipReason::NoDebugId,
        };
    };

    source.push_str("\n//# debugId=");
    source.push_str(&debug_id);

    let staged_bundle = staging.staged_file(&debug_id, chunk_index, ".js");
    let staged_map = staging.staged_file(&debug_id, chunk_index, ".js.map");

    // The map side runs the caller's rewrite hook. If it panics, let the bundle
    // write finish before the panic continues.
    let (bundle_written, map_written) = tokio::join!(
        write_bundle(&staged_bundle, &source),
        AssertUnwindSafe(stage_source_map(
            bundle_path,
            &source,
            &staged_map,
            &debug_id,
            rewrite_hook
        ))
        .catch_unwind(),
    );
    let map_written = match map_written {
        Ok(written) => written,
        Err(payload) => std::panic::resume_unwind(payload),
    };

    PrepareOutcome::Staged(StagedBundle {
        source_path: bundle_path.to_path_buf(),
        debug_id,
        chunk_index,
        bundle_path: bundle_written.then_some(staged_bundle),
        source_map_path: map_written.then_some(staged_map),
    })
}

async fn write_bundle(target: &Path, stamped_source: &str) -> bool {
    match tokio::fs::write(target, stamped_source).await {
        Ok(()) => true,
        Err(source) => {
            let err = Error::BundleWrite {
                path: target.to_path_buf(),
                source,
            };
            log::error!("{}", err);
            false
        }
    }
}

async fn stage_source_map(
    bundle_path: &Path,
    bundle_source: &str,
    target: &Path,
    debug_id: &str,
    rewrite_hook: &dyn RewriteSources,
) -> bool {
    let Some(map_path) = source_map_path_for_bundle(bundle_path, bundle_source).await else {
        return false;
    };

    match prepare_source_map(&map_path, target, debug_id, rewrite_hook).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("Skipping source map for {}: {}", bundle_path.display(), err);
            false
        }
    }
}
