use std::path::PathBuf;
use thiserror::Error;

/// Failures reported synchronously by a platform speech engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine still holds a previous run. Platform recognizers throw this
    /// when `start` races a `stop` that has not settled yet.
    #[error("engine busy: previous session not released")]
    Busy,
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of the external collaborators (classifier, content, reminders).
///
/// Cloneable so it can travel inside kernel events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for ServiceError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ServiceError::Timeout
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
