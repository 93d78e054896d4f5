//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The timezone name is not a known IANA zone.
    #[error("unknown timezone: {name}")]
    UnknownTimezone { name: String },

    /// A remote timestamp could not be parsed.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// A wall-clock time does not exist in the target timezone.
    #[error("local time {value} does not exist in {timezone}")]
    NonexistentLocalTime { value: String, timezone: String },

    /// An event ends before it starts.
    #[error("event ends before it starts ({start} > {end})")]
    InvertedRange { start: String, end: String },
}

impl CoreError {
    /// Creates an invalid timestamp error.
    pub fn invalid_timestamp(value: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
