//! Error telemetry sink used on the batch failure path.

use async_trait::async_trait;

/// Receives batch-level failures. Only the top-level handler calls into this.
#[async_trait]
pub trait Telemetry: Send + Sync {
    fn capture_exception(&self, message: &str);

    /// Pushes out anything buffered. Must not fail.
    async fn flush(&self);
}

/// Writes captured exceptions to the debug log. The recoverable-error handler
/// reports the actual error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

#[async_trait]
impl Telemetry for LogTelemetry {
    fn capture_exception(&self, message: &str) {
        log::debug!("Telemetry captured: {}", message);
    }

    async fn flush(&self) {}
}

/// Discards everything. Used when telemetry is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

#[async_trait]
impl Telemetry for NoopTelemetry {
    fn capture_exception(&self, _message: &str) {}

    async fn flush(&self) {}
}
