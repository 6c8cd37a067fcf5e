use thiserror::Error;

use crate::api_error::ApiError;

/// Centralized error type for sibyl-net.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    /// Transport-level failure (DNS, connect, TLS, broken body). Never
    /// retried by the request layer.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success response with a decoded payload.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl NetError {
    pub fn request(err: &reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }

    /// Status code of the remote response, if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetError::Api(api) => Some(api.status),
            _ => None,
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    fn status_code_only_for_api_errors() {
        let api = NetError::Api(ApiError {
            status: 503,
            ..ApiError::default()
        });
        assert_eq!(api.status_code(), Some(503));
        assert_eq!(NetError::Request("boom".into()).status_code(), None);
    }
}
