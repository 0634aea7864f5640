//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, FlexError>;

/// Reporter invoked when a file destination fails internally.
///
/// File I/O failures are never surfaced to the logging caller; they are
/// funneled through this callback instead so the host application can
/// observe them for diagnostics. The default reporter writes to stderr.
pub type ErrorReporter = std::sync::Arc<dyn Fn(&FlexError) + Send + Sync>;

/// Default fallback reporter: stderr with a recognizable prefix.
pub(crate) fn default_reporter() -> ErrorReporter {
    std::sync::Arc::new(|err| eprintln!("[FLEXLOG ERROR] {}", err))
}

#[derive(Debug, thiserror::Error)]
pub enum FlexError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File destination error with path
    #[error("File destination error for '{path}': {message}")]
    FileDestinationError { path: String, message: String },

    /// File trim error
    #[error("File trim failed for '{path}': {message}")]
    FileTrimError { path: String, message: String },

    /// Destination delivery error
    #[error("Destination '{id}' failed: {message}")]
    DestinationError { id: String, message: String },

    /// Structured text could not be pretty-printed
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl FlexError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        FlexError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        FlexError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file destination error
    pub fn file_destination(path: impl Into<String>, message: impl Into<String>) -> Self {
        FlexError::FileDestinationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file trim error
    pub fn file_trim(path: impl Into<String>, message: impl Into<String>) -> Self {
        FlexError::FileTrimError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a destination delivery error
    pub fn destination(id: impl Into<String>, message: impl Into<String>) -> Self {
        FlexError::DestinationError {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        FlexError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        FlexError::Other(msg.into())
    }
}
