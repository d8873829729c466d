//! Error types for toolgate.

use thiserror::Error;

/// Primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No tool registered under the requested name. Always surfaced to the
    /// caller, never retried.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Arguments failed structural or per-field validation. The handler is
    /// never called; all reasons are aggregated into one report.
    #[error("validation failed: {}", reasons.join("; "))]
    ValidationFailed { reasons: Vec<String> },

    /// The bound handler returned an error. Caught at the dispatcher
    /// boundary and surfaced verbatim.
    #[error("tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },

    /// Channel connect/listen failure. Fatal to that transport's start.
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid tool or parameter declaration, raised at declaration time.
    #[error("registration error: {0}")]
    Registration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error from a single reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            reasons: vec![reason.into()],
        }
    }

    /// Create an execution error for a named tool.
    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Convenience result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
