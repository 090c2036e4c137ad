use std::error::Error as StdError;

use thiserror::Error;

/// Glimpse's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Glimpse's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Soft "not ready yet" conditions are not represented here: an uninitialized engine yields
/// [`crate::ClassificationResult::NotReady`] and an uninitialized capture surface skips the tick.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A media source or classification engine could not be initialized.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// The platform reported an error while capturing a single frame.
    #[error("capture failed: {0}")]
    Capture(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_errors_keep_their_context_chain() {
        let err = anyhow::anyhow!("root cause").context("while loading engine");
        let err: Error = err.into();
        assert_eq!(err.to_string(), "while loading engine: root cause");
    }

    #[test]
    fn capture_errors_are_labelled() {
        let err = Error::capture("surface lost");
        assert_eq!(err.to_string(), "capture failed: surface lost");
    }
}
