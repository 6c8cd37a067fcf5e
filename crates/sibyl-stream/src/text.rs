use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use sibyl_net::ApiError;
use sibyl_sse::EventStream;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::trace;

use crate::error::StreamError;

/// The `output` events of a prediction as a byte stream.
///
/// Each output event contributes its data with the single trailing
/// newline the wire format appends stripped off. `logs` events are
/// skipped, an `error` event turns into [`StreamError::Remote`] and
/// ends the stream, `done` ends it cleanly.
pub struct TextStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>,
}

impl TextStream {
    pub fn new(mut events: EventStream) -> Self {
        let inner = async_stream::try_stream! {
            while let Some(event) = events.next_event().await? {
                if event.is_done() {
                    break;
                }
                if event.is_logs() {
                    trace!(len = event.data.len(), "skipping logs event");
                    continue;
                }
                if event.is_error() {
                    Err(StreamError::Remote(ApiError::from_event_data(&event.data)))?;
                }
                if !event.is_output() {
                    Err(StreamError::UnexpectedEvent(event.event_type.clone()))?;
                }
                let text = event
                    .data
                    .strip_suffix('\n')
                    .unwrap_or(&event.data)
                    .to_owned();
                yield Bytes::from(text);
            }
        };
        Self {
            inner: Box::pin(inner),
        }
    }

    /// Adapt the stream to `tokio::io::AsyncRead`.
    pub fn into_reader(self) -> impl AsyncRead + Send {
        StreamReader::new(self.inner.map_err(io::Error::other))
    }
}

impl Stream for TextStream {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
