use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use percent_encoding::percent_decode_str;
use thiserror::Error;

// RFC 2397 default when the media type is omitted.
const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("missing data: scheme")]
    MissingScheme,

    #[error("missing comma separating header from payload")]
    MissingComma,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A decoded `data:` URI (RFC 2397).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub data: Bytes,
}

impl DataUri {
    /// Parse `data:[<mediatype>][;base64],<payload>`, decoding the payload
    /// eagerly (base64 or percent-encoding).
    pub fn parse(raw: &str) -> Result<Self, DataUriError> {
        let rest = raw
            .strip_prefix("data:")
            .ok_or(DataUriError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingComma)?;

        let (media_type, base64_encoded) = match header.strip_suffix(";base64") {
            Some(media_type) => (media_type, true),
            None => (header, false),
        };
        let media_type = if media_type.is_empty() {
            DEFAULT_MEDIA_TYPE.to_owned()
        } else {
            media_type.to_owned()
        };

        let data = if base64_encoded {
            Bytes::from(STANDARD.decode(payload)?)
        } else {
            Bytes::from(percent_decode_str(payload).collect::<Vec<u8>>())
        };

        Ok(Self { media_type, data })
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("data:text/plain;base64,aGVsbG8=", "text/plain", b"hello")]
    #[case("data:application/octet-stream;base64,AAEC", "application/octet-stream", &[0, 1, 2])]
    #[case("data:text/plain,hello%20world", "text/plain", b"hello world")]
    #[case("data:,bare", "text/plain;charset=US-ASCII", b"bare")]
    #[case("data:;base64,aGk=", "text/plain;charset=US-ASCII", b"hi")]
    fn parses_data_uris(
        #[case] raw: &str,
        #[case] media_type: &str,
        #[case] data: &[u8],
    ) {
        let uri = DataUri::parse(raw).unwrap();
        assert_eq!(uri.media_type, media_type);
        assert_eq!(uri.data.as_ref(), data);
    }

    #[rstest]
    fn rejects_missing_scheme() {
        assert!(matches!(
            DataUri::parse("https://example.com"),
            Err(DataUriError::MissingScheme)
        ));
    }

    #[rstest]
    fn rejects_missing_comma() {
        assert!(matches!(
            DataUri::parse("data:text/plain;base64"),
            Err(DataUriError::MissingComma)
        ));
    }

    #[rstest]
    fn rejects_bad_base64() {
        assert!(matches!(
            DataUri::parse("data:;base64,not base64!"),
            Err(DataUriError::Base64(_))
        ));
    }
}
