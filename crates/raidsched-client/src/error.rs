//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A collaborator could not be set up.
    #[error(transparent)]
    Provider(#[from] raidsched_providers::ProviderError),

    /// The run failed.
    #[error(transparent)]
    Sync(#[from] raidsched_sync::SyncError),

    /// Output could not be rendered.
    #[error("failed to render output: {0}")]
    Render(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<raidsched_core::CoreError> for ClientError {
    fn from(err: raidsched_core::CoreError) -> Self {
        Self::Config(err.to_string())
    }
}
