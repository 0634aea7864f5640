//! # FlexLog
//!
//! A pluggable, multi-destination logging facility with size-bounded
//! rotating log files.
//!
//! ## Features
//!
//! - **Multiple Destinations**: Console, rotating file, and custom sinks
//! - **Bounded Log Files**: Append-only files trimmed asynchronously to a
//!   configured size ceiling, oldest lines first
//! - **Crash Capture**: Panic hook that records a Fatal crash report
//! - **Thread Safe**: Designed for concurrent environments
//! - **Easy to Use**: Builder-style configuration and `println!`-style macros
//!
//! ```
//! use flexlog::prelude::*;
//!
//! let logger = FlexLogger::with_config(
//!     LogConfig::new()
//!         .tag_prefix("MyApp")
//!         .min_level(LogLevel::Debug)
//!         .console(),
//! );
//!
//! logger.info(Some("Startup"), "Application started");
//! ```

#[cfg(feature = "ai-assist")]
pub mod ai;
pub mod core;
mod crash;
pub mod destinations;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        AiConfig, CrashVerbosity, Destination, ErrorInfo, FlexError, FlexLogger, FormatSymbols,
        LogConfig, LogField, LogLevel, LogRecord, Result,
    };
    pub use crate::destinations::{ConsoleDestination, FileDestination, RotatingFileManager};
}

pub use core::{
    AiConfig, CrashVerbosity, Destination, ErrorInfo, ErrorReporter, FlexError, FlexLogger,
    FormatSymbols, LogConfig, LogField, LogLevel, LogRecord, Result, DEFAULT_TIMESTAMP_FORMAT,
};
pub use destinations::{ConsoleDestination, FileDestination, RotatingFileManager, MAX_FILE_SIZE_MB};
