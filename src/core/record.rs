//! Log record structure

use super::level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local cache for the origin thread name to avoid repeated allocations
thread_local! {
    static THREAD_NAME_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get the cached thread name, computing and caching it on first access.
///
/// Unnamed threads fall back to the debug rendering of their `ThreadId`.
pub(crate) fn get_thread_name() -> String {
    THREAD_NAME_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            let current = std::thread::current();
            *cache = Some(
                current
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{:?}", current.id())),
            );
        }
        cache
            .as_ref()
            .expect("thread name cache initialized in previous line")
            .clone()
    })
}

/// Opaque error payload attached to a record: a message plus an optional
/// rendered stack trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    pub trace: Option<String>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Render the payload the way file destinations write it: the message,
    /// then the trace on its own line when present.
    pub fn render(&self) -> String {
        match &self.trace {
            Some(trace) => format!("{}\n{}", self.message, trace),
            None => self.message.clone(),
        }
    }
}

impl<E: std::error::Error> From<&E> for ErrorInfo {
    fn from(err: &E) -> Self {
        ErrorInfo::new(err.to_string())
    }
}

/// One immutable logging event. Created once per logging call and handed
/// by reference to every destination; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    /// Fully resolved tag, `"{prefix}/{tag-or-Default}"`.
    pub tag: String,
    pub message: String,
    pub error: Option<ErrorInfo>,
    pub timestamp: DateTime<Utc>,
    pub thread_name: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            tag: tag.into(),
            message: message.into(),
            error: None,
            timestamp: Utc::now(),
            thread_name: get_thread_name(),
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }
}
