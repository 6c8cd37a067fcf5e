use bytes::{Bytes, BytesMut};
use futures::{future, stream, StreamExt};
use sibyl_net::{ApiError, ByteStream, Headers, HttpClient, Net};
use sibyl_sse::EventStream;
use tracing::{debug, trace};
use url::Url;

use crate::{
    data_uri::DataUri,
    error::StreamError,
    value::{classify, FileSourceKind},
};

/// The `output` events of a prediction interpreted as file references.
///
/// Each output event carries one reference: a `data:` URI decoded
/// eagerly into an [`File::Inline`], or an http(s) URL wrapped in a
/// lazy [`File::Remote`] that is only fetched when its body is asked
/// for. Anything else classifies as [`File::Invalid`]; the error is
/// deferred to [`File::body`] so one malformed entry does not hide the
/// files after it.
pub struct FileStream {
    events: EventStream,
    client: HttpClient,
}

impl FileStream {
    pub fn new(events: EventStream, client: HttpClient) -> Self {
        Self { events, client }
    }

    /// Next file reference. `Ok(None)` once the prediction is done.
    pub async fn next_file(&mut self) -> Result<Option<File>, StreamError> {
        loop {
            let Some(event) = self.events.next_event().await? else {
                return Ok(None);
            };
            if event.is_done() {
                return Ok(None);
            }
            if event.is_logs() {
                trace!(len = event.data.len(), "skipping logs event");
                continue;
            }
            if event.is_error() {
                return Err(StreamError::Remote(ApiError::from_event_data(&event.data)));
            }
            if !event.is_output() {
                return Err(StreamError::UnexpectedEvent(event.event_type));
            }

            let raw = event
                .data
                .strip_suffix('\n')
                .unwrap_or(&event.data)
                .to_owned();
            return Ok(Some(File::classify(raw, self.client.clone())));
        }
    }
}

/// One file produced by a prediction.
#[derive(Debug, Clone)]
pub enum File {
    /// Bytes carried inline in a `data:` URI, already decoded.
    Inline { media_type: String, data: Bytes },
    /// A URL fetched on demand through the shared client.
    Remote { client: HttpClient, url: Url },
    /// An entry that is neither; surfaced as an error on access.
    Invalid { raw: String, reason: String },
}

impl File {
    fn classify(raw: String, client: HttpClient) -> File {
        match classify(&raw) {
            FileSourceKind::DataUri => match DataUri::parse(&raw) {
                Ok(uri) => File::Inline {
                    media_type: uri.media_type,
                    data: uri.data,
                },
                Err(err) => File::Invalid {
                    raw,
                    reason: err.to_string(),
                },
            },
            FileSourceKind::Url => match Url::parse(&raw) {
                Ok(url) => File::Remote { client, url },
                Err(err) => File::Invalid {
                    raw,
                    reason: err.to_string(),
                },
            },
            FileSourceKind::Plain => File::Invalid {
                raw,
                reason: "not a data URI or http(s) URL".to_owned(),
            },
        }
    }

    /// Media type, known only for inline files.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            File::Inline { media_type, .. } => Some(media_type),
            File::Remote { .. } | File::Invalid { .. } => None,
        }
    }

    /// Source URL, known only for remote files.
    pub fn url(&self) -> Option<&Url> {
        match self {
            File::Remote { url, .. } => Some(url),
            File::Inline { .. } | File::Invalid { .. } => None,
        }
    }

    /// The file body as a byte stream. Remote files are fetched here,
    /// not before; invalid entries fail here.
    pub async fn body(&self) -> Result<ByteStream, StreamError> {
        match self {
            File::Inline { data, .. } => {
                let data = data.clone();
                Ok(Box::pin(stream::once(future::ready(Ok(data)))))
            }
            File::Remote { client, url } => {
                debug!(url = %url, "fetching remote file");
                let body = client.stream(url.clone(), Headers::new()).await?;
                Ok(body)
            }
            File::Invalid { raw, reason } => Err(StreamError::InvalidFile {
                raw: raw.clone(),
                reason: reason.clone(),
            }),
        }
    }

    /// The file body collected into one buffer.
    pub async fn bytes(&self) -> Result<Bytes, StreamError> {
        let mut body = self.body().await?;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}
