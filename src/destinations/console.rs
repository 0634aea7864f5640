//! Console destination implementation

use crate::core::destination::Destination;
use crate::core::error::Result;
use crate::core::level::LogLevel;
use crate::core::record::LogRecord;
use colored::Colorize;

/// Stateless pass-through sink for the terminal.
///
/// Error and Fatal records go to stderr, everything else to stdout. An
/// error payload on the record is printed on the following lines, the same
/// shape file destinations write.
pub struct ConsoleDestination {
    use_colors: bool,
}

impl ConsoleDestination {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn render(&self, record: &LogRecord, formatted: &str) -> String {
        let line = if self.use_colors {
            formatted.color(record.level.color_code()).to_string()
        } else {
            formatted.to_string()
        };

        match &record.error {
            Some(error) => format!("{}\n{}", line, error.render()),
            None => line,
        }
    }
}

impl Default for ConsoleDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination for ConsoleDestination {
    fn send(&self, record: &LogRecord, formatted: &str) -> Result<()> {
        let output = self.render(record, formatted);

        match record.level {
            LogLevel::Error | LogLevel::Fatal => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn id(&self) -> &str {
        "flexlog.console"
    }

    fn flush(&self) -> Result<()> {
        use std::io::Write;
        // Flush both streams since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ErrorInfo;

    #[test]
    fn test_render_without_colors() {
        let destination = ConsoleDestination::with_colors(false);
        let record = LogRecord::new(LogLevel::Info, "App/Test", "hello");

        assert_eq!(destination.render(&record, "I/App/Test: hello"), "I/App/Test: hello");
    }

    #[test]
    fn test_render_includes_error_payload() {
        let destination = ConsoleDestination::with_colors(false);
        let record = LogRecord::new(LogLevel::Error, "App/Test", "failed")
            .with_error(ErrorInfo::new("boom").with_trace("at main.rs:1"));

        assert_eq!(
            destination.render(&record, "E/App/Test: failed"),
            "E/App/Test: failed\nboom\nat main.rs:1"
        );
    }

    #[test]
    fn test_identifier() {
        assert_eq!(ConsoleDestination::new().id(), "flexlog.console");
        assert!(!ConsoleDestination::new().is_file_backed());
    }
}
