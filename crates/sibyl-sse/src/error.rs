use sibyl_net::{ApiError, NetError};
use thiserror::Error;

/// Errors from the block decoder.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream ended before a terminating blank line.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Assembled `data` was not valid UTF-8. The offending block has been
    /// consumed; iteration may continue.
    #[error("invalid UTF-8 data")]
    InvalidUtf8,

    /// The underlying byte stream failed mid-body. Treated as connection
    /// loss by the transport.
    #[error("connection lost: {0}")]
    Connection(#[source] NetError),
}

/// Errors from the resilient transport.
#[derive(Debug, Error)]
pub enum SseError {
    /// Non-200 response on (re)connect. Fatal, never retried.
    #[error("received invalid status code: {}", .0.status)]
    Status(ApiError),

    /// Transport-level failure issuing the (re)connect request.
    #[error(transparent)]
    Net(NetError),

    /// Reconnect budget exhausted before a terminal event arrived.
    #[error("exceeded maximum retries after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    /// Framing error: a block's data was not UTF-8. The stream survives
    /// this; the caller may keep iterating.
    #[error("invalid UTF-8 data")]
    InvalidUtf8,

    /// The cancellation token fired. Terminal; repeated polls keep
    /// returning this kind.
    #[error("stream cancelled")]
    Cancelled,

    /// The stream previously failed terminally.
    #[error("stream closed")]
    Closed,
}

pub type SseResult<T> = Result<T, SseError>;
