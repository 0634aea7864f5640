//! Destination trait for log output sinks

use super::{error::Result, record::LogRecord};

/// A consumer of formatted log records.
///
/// Implement this to send logs to custom backends (remote collectors,
/// analytics pipelines, in-memory buffers for tests). Destinations receive
/// both the structured record and the string the dispatcher formatted from
/// it, so a sink may re-render or pass through as it sees fit.
pub trait Destination: Send + Sync {
    fn send(&self, record: &LogRecord, formatted: &str) -> Result<()>;

    /// Unique identifier per destination instance, used for set membership
    /// when destinations are added to a configuration.
    fn id(&self) -> &str;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// File-backed destinations opt in; crash logging is only wired up when
    /// at least one of these is configured.
    fn is_file_backed(&self) -> bool {
        false
    }
}
