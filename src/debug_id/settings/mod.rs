//! Configuration structures for debug id upload batches.

mod builder;
mod core;

pub use builder::UploadSettingsBuilder;
pub use self::core::UploadSettings;
