//! Record formatting
//!
//! A pure mapping from a record plus configuration to its display string.
//! Field order and per-field symbols come from the configuration; fields
//! that are toggled off contribute nothing, not even their symbols.

use super::config::{LogConfig, LogField};
use super::record::LogRecord;

/// Format a record according to the configured field order and symbols.
pub fn format_record(record: &LogRecord, config: &LogConfig) -> String {
    let symbols = &config.symbols;
    let mut out = String::new();

    for field in &config.format_order {
        match field {
            LogField::Timestamp => {
                if config.show_timestamp {
                    out.push_str(&symbols.timestamp_prefix);
                    out.push_str(
                        &record
                            .timestamp
                            .format(&config.timestamp_format)
                            .to_string(),
                    );
                    out.push_str(&symbols.timestamp_suffix);
                }
            }
            LogField::Level => {
                out.push_str(&symbols.level_prefix);
                out.push(record.level.initial());
                out.push_str(&symbols.level_suffix);
            }
            LogField::Tag => {
                out.push_str(&symbols.tag_prefix);
                out.push_str(&record.tag);
                out.push_str(&symbols.tag_suffix);
            }
            LogField::Thread => {
                if config.show_thread {
                    out.push_str(&symbols.thread_prefix);
                    out.push_str(&record.thread_name);
                    out.push_str(&symbols.thread_suffix);
                }
            }
            LogField::Message => {
                out.push_str(&symbols.message_prefix);
                out.push_str(&record.message);
                out.push_str(&symbols.message_suffix);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FormatSymbols;
    use crate::core::level::LogLevel;

    fn record(level: LogLevel, tag: &str, message: &str, thread: &str) -> LogRecord {
        let mut record = LogRecord::new(level, tag, message);
        record.thread_name = thread.to_string();
        record
    }

    #[test]
    fn test_default_format_shape() {
        let config = LogConfig::default();
        let record = record(LogLevel::Debug, "App/Net", "hello", "worker");

        let formatted = format_record(&record, &config);

        // "<timestamp> D/App/Net[worker]: hello"
        assert!(formatted.ends_with("D/App/Net[worker]: hello"));
        assert!(formatted.len() > "D/App/Net[worker]: hello".len());
    }

    #[test]
    fn test_custom_order_and_symbols() {
        let config = LogConfig::new()
            .show_timestamp(false)
            .show_thread(true)
            .format_order(vec![
                LogField::Tag,
                LogField::Level,
                LogField::Thread,
                LogField::Message,
            ])
            .symbols(FormatSymbols {
                level_suffix: " => ".to_string(),
                thread_prefix: "<<".to_string(),
                thread_suffix: ">>".to_string(),
                message_prefix: " :: ".to_string(),
                timestamp_suffix: " ~ ".to_string(),
                ..FormatSymbols::default()
            });

        let record = record(
            LogLevel::Debug,
            "TestApp/FormatTag",
            "Formatting test",
            "Test worker",
        );

        assert_eq!(
            format_record(&record, &config),
            "TestApp/FormatTagD => <<Test worker>> :: Formatting test"
        );
    }

    #[test]
    fn test_disabled_fields_drop_their_symbols() {
        let config = LogConfig::new().show_timestamp(false).show_thread(false);
        let record = record(LogLevel::Info, "App/Default", "msg", "main");

        let formatted = format_record(&record, &config);
        assert_eq!(formatted, "I/App/Default: msg");
        assert!(!formatted.contains('['));
    }

    #[test]
    fn test_timestamp_pattern_is_applied() {
        let config = LogConfig::new()
            .show_thread(false)
            .timestamp_format("%Y".to_string());
        let record = record(LogLevel::Info, "App/Default", "msg", "main");

        let formatted = format_record(&record, &config);
        let year = record.timestamp.format("%Y").to_string();
        assert!(formatted.starts_with(&year));
    }
}
