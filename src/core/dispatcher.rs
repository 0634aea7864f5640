//! The dispatcher: owns the live configuration and fans records out
//!
//! `FlexLogger` converts a logging call into a [`LogRecord`], formats it
//! once, and delivers it synchronously to every configured destination.
//! Destination failures are isolated from each other and from the caller;
//! nothing a destination does can crash the host application.

use super::config::LogConfig;
use super::formatter::format_record;
use super::level::LogLevel;
use super::record::{ErrorInfo, LogRecord};
use super::xml;
use parking_lot::RwLock;
use std::sync::Arc;

pub struct FlexLogger {
    config: RwLock<Arc<LogConfig>>,
}

impl FlexLogger {
    /// Create a logger with the default configuration (enabled, no
    /// destinations). Call [`configure`](Self::configure) to make it useful.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            config: RwLock::new(Arc::new(LogConfig::default())),
        })
    }

    /// Create a logger and immediately make `config` live.
    pub fn with_config(config: LogConfig) -> Arc<Self> {
        let logger = Self::new();
        logger.configure(config);
        logger
    }

    /// Atomically replace the live configuration.
    ///
    /// The snapshot is swapped wholesale; in-flight `log` calls finish
    /// against the configuration they started with. When crash logging is
    /// enabled and a file-backed destination is present, the crash hook is
    /// (re)installed, chaining to whatever hook was registered before.
    pub fn configure(self: &Arc<Self>, config: LogConfig) {
        let install_hook = config.crash_logging && config.has_file_destination();
        *self.config.write() = Arc::new(config);

        if install_hook {
            crate::crash::install(Arc::clone(self));
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<LogConfig> {
        Arc::clone(&self.config.read())
    }

    /// Core logging entry point all public helpers call.
    ///
    /// No-op when the logger is disabled or `level` is below the configured
    /// minimum. The tag resolves to `"{prefix}/{tag-or-Default}"`.
    pub fn log(
        &self,
        level: LogLevel,
        tag: Option<&str>,
        message: impl Into<String>,
        error: Option<ErrorInfo>,
    ) {
        let config = self.snapshot();
        if !config.enabled || level < config.min_level {
            return;
        }

        let tag = format!("{}/{}", config.tag_prefix, tag.unwrap_or("Default"));
        let mut record = LogRecord::new(level, tag, message);
        if let Some(error) = error {
            record = record.with_error(error);
        }

        let formatted = format_record(&record, &config);
        Self::deliver(&config, &record, &formatted);
    }

    /// Deliver one formatted record to every destination, isolating
    /// failures per destination so one broken sink cannot suppress the
    /// others or reach the caller.
    fn deliver(config: &LogConfig, record: &LogRecord, formatted: &str) {
        for destination in &config.destinations {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                destination.send(record, formatted)
            }));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[FLEXLOG ERROR] Destination '{}' failed: {}",
                        destination.id(),
                        e
                    );
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[FLEXLOG CRITICAL] Destination '{}' panicked: {}. \
                         Other destinations continue to function.",
                        destination.id(),
                        panic_msg
                    );
                }
            }
        }
    }

    #[inline]
    pub fn trace(&self, tag: Option<&str>, message: impl Into<String>) {
        self.log(LogLevel::Trace, tag, message, None);
    }

    #[inline]
    pub fn debug(&self, tag: Option<&str>, message: impl Into<String>) {
        self.log(LogLevel::Debug, tag, message, None);
    }

    #[inline]
    pub fn info(&self, tag: Option<&str>, message: impl Into<String>) {
        self.log(LogLevel::Info, tag, message, None);
    }

    #[inline]
    pub fn warn(&self, tag: Option<&str>, message: impl Into<String>) {
        self.log(LogLevel::Warn, tag, message, None);
    }

    #[inline]
    pub fn error(&self, tag: Option<&str>, message: impl Into<String>, error: Option<ErrorInfo>) {
        self.log(LogLevel::Error, tag, message, error);
    }

    #[inline]
    pub fn fatal(&self, tag: Option<&str>, message: impl Into<String>, error: Option<ErrorInfo>) {
        self.log(LogLevel::Fatal, tag, message, error);
    }

    /// Log a JSON string pretty-printed with 2-space indentation.
    ///
    /// Blank or absent input logs a fixed placeholder. Input that does not
    /// open with `{` or `[` is logged as `Invalid JSON format: ...` at the
    /// requested level. A parse failure logs a diagnostic at Error and then
    /// the raw text unmodified at the requested level, so the entry is
    /// never dropped.
    pub fn json(&self, tag: Option<&str>, level: LogLevel, json_str: Option<&str>) {
        let Some(raw) = json_str.map(str::trim).filter(|s| !s.is_empty()) else {
            self.log(level, tag, "Received null or empty JSON string.", None);
            return;
        };

        if !(raw.starts_with('{') || raw.starts_with('[')) {
            self.log(level, tag, format!("Invalid JSON format: {}", raw), None);
            return;
        }

        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => {
                let pretty = serde_json::to_string_pretty(&value)
                    .unwrap_or_else(|_| raw.to_string());
                self.log(level, tag, pretty, None);
            }
            Err(e) => {
                self.log(
                    LogLevel::Error,
                    tag,
                    "Failed to parse JSON string.",
                    Some(ErrorInfo::from(&e)),
                );
                self.log(level, tag, raw, None);
            }
        }
    }

    /// Log an XML string pretty-printed with 2-space indentation.
    ///
    /// Same fallback contract as [`json`](Self::json): blank input logs a
    /// placeholder; malformed input logs a diagnostic at Error followed by
    /// the raw text at the requested level.
    pub fn xml(&self, tag: Option<&str>, level: LogLevel, xml_str: Option<&str>) {
        let Some(raw) = xml_str.map(str::trim).filter(|s| !s.is_empty()) else {
            self.log(level, tag, "Received null or empty XML string.", None);
            return;
        };

        match xml::pretty_print(raw) {
            Ok(pretty) => self.log(level, tag, pretty, None),
            Err(e) => {
                self.log(
                    LogLevel::Error,
                    tag,
                    "Failed to parse XML string.",
                    Some(ErrorInfo::new(e.to_string())),
                );
                self.log(level, tag, raw, None);
            }
        }
    }

    /// Flush every destination; file destinations wait for scheduled trims
    /// to settle.
    pub fn flush(&self) {
        let config = self.snapshot();
        for destination in &config.destinations {
            if let Err(e) = destination.flush() {
                eprintln!(
                    "[FLEXLOG ERROR] Destination '{}' flush failed: {}",
                    destination.id(),
                    e
                );
            }
        }
    }
}
