//! Debug id source map staging and upload.
//!
//! This library finds built script bundles carrying an embedded debug id,
//! pairs them with their source maps, and stages both for upload as a single
//! artifact bundle:
//! - debug id extraction and `//# debugId=` stamping
//! - source map discovery, id injection and `sources` rewriting
//! - concurrent, failure-isolated preparation with guaranteed cleanup
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod config;
pub mod debug_id;
pub mod error;

// Re-export commonly used types
pub use error::{AppError, CliError, Result};
