//! debug_id_upload - stages debug-id stamped bundles and source maps for upload.
//!
//! This binary discovers built script bundles, pairs them with their source
//! maps and hands the staged artifact bundle to sentry-cli.

use debug_id_upload::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
