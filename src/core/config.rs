//! Logger configuration
//!
//! A `LogConfig` is assembled with builder-style calls, then handed to
//! [`FlexLogger::configure`](crate::core::dispatcher::FlexLogger::configure),
//! which makes it live as one atomic swap. After that the snapshot is never
//! partially mutated; reconfiguration always replaces the whole thing.

use super::destination::Destination;
use super::level::LogLevel;
use crate::destinations::{ConsoleDestination, FileDestination};
use std::path::Path;

/// Default strftime pattern: millisecond wall-clock timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// The fields a formatted line can be assembled from, in configurable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogField {
    Timestamp,
    Level,
    Tag,
    Thread,
    Message,
}

impl LogField {
    /// Default field ordering for formatted output.
    pub fn default_order() -> Vec<LogField> {
        vec![
            LogField::Timestamp,
            LogField::Level,
            LogField::Tag,
            LogField::Thread,
            LogField::Message,
        ]
    }
}

/// Customizable symbols wrapped around each formatted field.
/// Each field has an optional prefix and suffix for full control.
#[derive(Debug, Clone)]
pub struct FormatSymbols {
    pub timestamp_prefix: String,
    pub timestamp_suffix: String,
    pub level_prefix: String,
    pub level_suffix: String,
    pub tag_prefix: String,
    pub tag_suffix: String,
    pub thread_prefix: String,
    pub thread_suffix: String,
    pub message_prefix: String,
    pub message_suffix: String,
}

impl Default for FormatSymbols {
    fn default() -> Self {
        Self {
            timestamp_prefix: String::new(),
            timestamp_suffix: " ".to_string(),
            level_prefix: String::new(),
            level_suffix: "/".to_string(),
            tag_prefix: String::new(),
            tag_suffix: String::new(),
            thread_prefix: "[".to_string(),
            thread_suffix: "]".to_string(),
            message_prefix: ": ".to_string(),
            message_suffix: String::new(),
        }
    }
}

/// How much detail a crash record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrashVerbosity {
    /// Panic message only
    Small,
    /// Panic message, thread name, and the panic location
    #[default]
    Medium,
    /// Thread name plus a full captured backtrace
    Large,
}

/// Credentials and options for the optional remote crash summary.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub language: String,
}

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash".to_string(),
            language: "English".to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Holds the configuration for one logger instance.
pub struct LogConfig {
    pub enabled: bool,
    pub min_level: LogLevel,
    pub tag_prefix: String,
    pub show_timestamp: bool,
    pub show_thread: bool,
    pub timestamp_format: String,
    pub format_order: Vec<LogField>,
    pub symbols: FormatSymbols,
    pub crash_logging: bool,
    pub crash_verbosity: CrashVerbosity,
    pub ai: Option<AiConfig>,
    pub(crate) destinations: Vec<Box<dyn Destination>>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_level: LogLevel::Trace,
            tag_prefix: "App".to_string(),
            show_timestamp: true,
            show_thread: true,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            format_order: LogField::default_order(),
            symbols: FormatSymbols::default(),
            crash_logging: true,
            crash_verbosity: CrashVerbosity::default(),
            ai: None,
            destinations: Vec::new(),
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_timestamp(mut self, show: bool) -> Self {
        self.show_timestamp = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_thread(mut self, show: bool) -> Self {
        self.show_thread = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, pattern: impl Into<String>) -> Self {
        self.timestamp_format = pattern.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format_order(mut self, order: Vec<LogField>) -> Self {
        self.format_order = order;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn symbols(mut self, symbols: FormatSymbols) -> Self {
        self.symbols = symbols;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn crash_logging(mut self, enabled: bool) -> Self {
        self.crash_logging = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn crash_verbosity(mut self, verbosity: CrashVerbosity) -> Self {
        self.crash_verbosity = verbosity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn ai_assist(mut self, ai: AiConfig) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Add a destination. Destinations form a set keyed by
    /// [`Destination::id`]; adding a second destination with an id that is
    /// already present is a no-op.
    #[must_use = "builder methods return a new value"]
    pub fn destination<D: Destination + 'static>(mut self, destination: D) -> Self {
        self.add_destination(Box::new(destination));
        self
    }

    /// Add the console destination.
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self) -> Self {
        self.add_destination(Box::new(ConsoleDestination::new()));
        self
    }

    /// Add a size-bounded file destination.
    ///
    /// # Errors
    ///
    /// Fails if `max_mb` exceeds the absolute ceiling or the log directory
    /// cannot be created.
    pub fn file(mut self, path: impl AsRef<Path>, max_mb: u64) -> crate::core::Result<Self> {
        let destination = FileDestination::new(path, max_mb)?;
        self.add_destination(Box::new(destination));
        Ok(self)
    }

    fn add_destination(&mut self, destination: Box<dyn Destination>) {
        if self
            .destinations
            .iter()
            .any(|d| d.id() == destination.id())
        {
            return;
        }
        self.destinations.push(destination);
    }

    pub(crate) fn has_file_destination(&self) -> bool {
        self.destinations.iter().any(|d| d.is_file_backed())
    }
}
