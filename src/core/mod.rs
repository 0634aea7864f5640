//! Core logger types and traits

pub mod config;
pub mod destination;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod level;
pub mod record;
pub mod xml;

pub use config::{
    AiConfig, CrashVerbosity, FormatSymbols, LogConfig, LogField, DEFAULT_TIMESTAMP_FORMAT,
};
pub use destination::Destination;
pub use dispatcher::FlexLogger;
pub use error::{ErrorReporter, FlexError, Result};
pub use formatter::format_record;
pub use level::LogLevel;
pub use record::{ErrorInfo, LogRecord};
