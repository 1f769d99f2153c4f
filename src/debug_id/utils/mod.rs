//! Shared helpers for the staging pipeline.

pub mod fs;
