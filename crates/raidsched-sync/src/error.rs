//! Run error types.

use std::fmt;

use raidsched_core::CoreError;
use raidsched_providers::{ProviderError, ProviderErrorCode};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// The step of a run a collaborator call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading the schedule source.
    Fetch,
    /// Listing published events.
    List,
    /// Creating a published event.
    Create,
    /// Announcing today's event.
    Notify,
    /// Deleting a stale event.
    Delete,
    /// Re-listing published events for the export.
    Export,
    /// Handing the calendar to the publisher.
    Publish,
}

impl Phase {
    /// Returns the lowercase phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::List => "list",
            Self::Create => "create",
            Self::Notify => "notify",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a fatal run error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration, raised before any remote call.
    Configuration,
    /// Network or HTTP failure of a collaborator.
    Transport,
    /// A collaborator answered with a payload that could not be decoded.
    Decode,
    /// A directory response had no usable reset-after signal.
    RateLimit,
    /// Source data could not be turned into duties.
    Data,
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A collaborator call failed.
    #[error("{phase} failed: {source}")]
    Provider {
        phase: Phase,
        #[source]
        source: ProviderError,
    },

    /// Time or timezone handling failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns a mapper that tags a provider error with `phase`.
    pub fn at(phase: Phase) -> impl FnOnce(ProviderError) -> Self {
        move |source| Self::Provider { phase, source }
    }

    /// Returns the phase a provider error happened in.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Provider { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Configuration,
            Self::Core(_) => ErrorKind::Data,
            Self::Provider { source, .. } => match source.code() {
                ProviderErrorCode::ConfigurationError => ErrorKind::Configuration,
                ProviderErrorCode::InvalidResponse => ErrorKind::Decode,
                ProviderErrorCode::RateLimitSignalMissing => ErrorKind::RateLimit,
                ProviderErrorCode::DataError => ErrorKind::Data,
                _ => ErrorKind::Transport,
            },
        }
    }
}
