//! Error types for registration operations

use thiserror::Error;

/// Caller-visible registration failures
///
/// Stable codes so remote cluster callers can interpret them uniformly.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The identity already holds a live session and the retry bound
    /// was exhausted without the entry freeing up
    #[error("Identity already connected")]
    AlreadyConnected,

    /// Table or channel-bind failure; partially created state has been
    /// torn down by the time this surfaces
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, RegistrarError>;
