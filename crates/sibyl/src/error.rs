use sibyl_net::NetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No token given to the builder and `SIBYL_API_TOKEN` is unset.
    #[error("no API token: pass one to the builder or set SIBYL_API_TOKEN")]
    MissingToken,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The prediction resource carries no `stream` URL, so it cannot be
    /// streamed.
    #[error("prediction {0} has no stream URL")]
    MissingStreamUrl(String),

    #[error("invalid stream URL: {0}")]
    InvalidStreamUrl(String),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error("response decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
