//! Error types shared across the crate.

use thiserror::Error;

/// Errors that can occur while configuring, building, or querying an index.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid caller input: bad match mode, malformed pattern list,
    /// non-positive configuration. Rejected before any work begins.
    #[error("invalid usage: {0}")]
    Usage(String),

    /// A query reached a backend that has not completed a build.
    #[error("index has not been built; call build() before querying")]
    NotBuilt,

    /// The registry has no backend under this name.
    #[error("unknown backend '{0}'")]
    UnknownBackend(String),

    /// Occurrence offsets were requested from a membership-only backend.
    #[error("backend '{0}' does not track match positions")]
    PositionsUnsupported(&'static str),
}

impl Error {
    /// Shorthand for a [`Error::Usage`] with a formatted message.
    pub fn usage(msg: impl Into<String>) -> Self {
        Error::Usage(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
