use std::{fmt, time::Duration};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::Headers;

/// Standard error payload returned by the remote service.
///
/// Also carried verbatim inside `error`-type SSE events, so the streaming
/// projections reuse the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub status: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    /// Parsed `Retry-After` response header, if the response carried one.
    #[serde(skip)]
    pub retry_after: Option<Duration>,
}

fn is_zero(status: &u16) -> bool {
    *status == 0
}

impl ApiError {
    /// Build an error from a non-success response.
    ///
    /// The body is decoded as the standard JSON shape where possible; an
    /// undecodable body is preserved in `detail`. A missing `status` field
    /// falls back to the response status.
    pub fn from_response(status: u16, headers: &Headers, body: &Bytes) -> Self {
        let mut error = match serde_json::from_slice::<ApiError>(body) {
            Ok(error) => error,
            Err(err) => ApiError {
                detail: format!("unknown error: {err}"),
                ..ApiError::default()
            },
        };

        if error.status == 0 {
            error.status = status;
        }
        error.retry_after = headers.get("Retry-After").and_then(parse_retry_after);
        error
    }

    /// Decode the standard shape from an SSE `error` event payload.
    ///
    /// Payloads that are not the standard JSON shape are kept as `detail`.
    pub fn from_event_data(data: &str) -> Self {
        serde_json::from_str::<ApiError>(data).unwrap_or_else(|_| ApiError {
            detail: data.to_string(),
            ..ApiError::default()
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components: Vec<&str> = [&self.kind, &self.title, &self.detail]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect();

        if components.is_empty() {
            write!(f, "unknown error")?;
        } else {
            write!(f, "{}", components.join(": "))?;
        }

        if !self.instance.is_empty() {
            write!(f, " ({})", self.instance)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Parse a `Retry-After` value: integer seconds or an HTTP-date.
///
/// A date in the past maps to a zero delay rather than an error.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    if let Ok(datetime) = httpdate::parse_http_date(value) {
        let delay = datetime
            .duration_since(std::time::SystemTime::now())
            .unwrap_or(Duration::ZERO);
        return Some(delay);
    }
    None
}
