use sibyl_net::{ApiError, NetError};
use sibyl_sse::SseError;
use thiserror::Error;

/// Errors surfaced by the typed projections.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Transport failure underneath the projection.
    #[error(transparent)]
    Sse(#[from] SseError),

    /// The remote service reported a prediction failure via an
    /// `error`-type event.
    #[error("remote error: {0}")]
    Remote(ApiError),

    /// An event type the projection has no mapping for.
    #[error("unknown event type {0:?}")]
    UnexpectedEvent(String),

    /// An output entry that is neither a data URI nor an http(s) URL.
    /// Raised when the file body is requested, not at classification.
    #[error("could not parse file URL {raw:?}: {reason}")]
    InvalidFile { raw: String, reason: String },

    /// Fetching a remote file body failed.
    #[error(transparent)]
    Net(#[from] NetError),
}
