//! Command line interface for debug id uploads.
//!
//! Parses arguments, merges the optional configuration file, runs one batch
//! and maps its outcome to an exit code.

mod args;

pub use args::{Args, RuntimeConfig};

use crate::config::{FileConfig, load_config};
use crate::debug_id::{BatchReport, DebugIdUpload, NoopTelemetry, SentryCliUploader};
use crate::error::{CliError, Result};
use std::sync::{Arc, Mutex};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    init_logging(args.verbose);

    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let file = match &args.config {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            load_config(path).await?
        }
        None => FileConfig::default(),
    };

    let artifacts = args.artifacts.clone();
    let runtime = RuntimeConfig::resolve(args, file);
    let settings = runtime.settings.build()?;

    let last_error = Arc::new(Mutex::new(None::<String>));
    let recorded = Arc::clone(&last_error);

    let mut batch = DebugIdUpload::new(settings, SentryCliUploader::new(runtime.upload))
        .with_recoverable_error_handler(move |err| {
            log::error!("Debug ID upload failed: {}", err);
            if let Ok(mut slot) = recorded.lock() {
                *slot = Some(err.to_string());
            }
        });
    if !runtime.telemetry {
        batch = batch.with_telemetry(NoopTelemetry);
    }

    let report = batch.run(&artifacts).await;
    log_report(&report);

    if report.failed && runtime.strict {
        let reason = last_error
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(CliError::BatchFailed { reason }.into());
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // Ignore double initialisation when embedded in a host that already set a logger
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

fn log_report(report: &BatchReport) {
    let with_maps = report
        .staged
        .iter()
        .filter(|s| s.source_map_path.is_some())
        .count();
    log::info!(
        "Debug ID upload: {} candidate(s), {} staged ({} with source maps), {} skipped, uploaded: {}, {} deleted",
        report.candidates,
        report.staged.len(),
        with_maps,
        report.skipped,
        report.uploaded,
        report.deleted
    );
}
