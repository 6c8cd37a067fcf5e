use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use sibyl_net::NetError;

use crate::{
    error::DecodeError,
    event::{Event, TYPE_DEFAULT},
};

/// Incremental SSE block decoder over a chunked byte stream.
///
/// Lines are delimited by `\n`; a blank line completes a block. `data:`
/// payloads are accumulated in a growable buffer, so multi-megabyte values
/// are never clipped by a fixed read size.
#[derive(Debug)]
pub struct Decoder<S> {
    stream: S,
    buf: BytesMut,
    /// Start offset for the next newline scan; avoids rescanning the head
    /// of the buffer while a long line is still arriving.
    scanned: usize,
    ended: bool,
}

impl<S> Decoder<S>
where
    S: Stream<Item = Result<Bytes, NetError>> + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: BytesMut::new(),
            scanned: 0,
            ended: false,
        }
    }

    /// Decode the next block.
    ///
    /// `Ok(None)` is a clean end of the byte stream between blocks.
    /// Ending mid-block is [`DecodeError::UnexpectedEof`].
    pub async fn next(&mut self) -> Result<Option<Event>, DecodeError> {
        let mut event_type: Option<String> = None;
        let mut id: Option<String> = None;
        let mut data: Vec<u8> = Vec::new();
        let mut in_block = false;

        loop {
            if let Some(line) = self.take_line() {
                if line.len() == 1 {
                    // blank line: the block is complete
                    let data = String::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
                    return Ok(Some(Event {
                        event_type: event_type.unwrap_or_else(|| TYPE_DEFAULT.to_string()),
                        id: id.unwrap_or_default(),
                        data,
                    }));
                }
                in_block = true;
                parse_line(&line, &mut event_type, &mut id, &mut data);
                continue;
            }

            if self.ended {
                if in_block || !self.buf.is_empty() {
                    return Err(DecodeError::UnexpectedEof);
                }
                return Ok(None);
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    self.ended = true;
                    return Err(DecodeError::Connection(err));
                }
                None => self.ended = true,
            }
        }
    }

    /// Split off one `\n`-terminated line (newline included), if buffered.
    fn take_line(&mut self) -> Option<BytesMut> {
        let pos = self.buf[self.scanned..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| self.scanned + i);

        match pos {
            Some(pos) => {
                self.scanned = 0;
                Some(self.buf.split_to(pos + 1))
            }
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }
}

/// Apply one non-blank line to the block under construction.
///
/// Split on the first `:`; at most one leading space is stripped from the
/// value. `data` values keep their terminating newline so consecutive data
/// lines join on `\n`. Comments (leading `:`), `retry`, colon-less lines
/// and unknown fields contribute nothing.
fn parse_line(
    line: &[u8],
    event_type: &mut Option<String>,
    id: &mut Option<String>,
    data: &mut Vec<u8>,
) {
    if line.starts_with(b":") {
        return;
    }
    let Some(colon) = line.iter().position(|&b| b == b':') else {
        return;
    };

    let field = &line[..colon];
    let mut value = &line[colon + 1..];
    if value.starts_with(b" ") {
        value = &value[1..];
    }

    match field {
        b"event" => *event_type = Some(trimmed_to_string(value)),
        b"id" => *id = Some(trimmed_to_string(value)),
        b"data" => data.extend_from_slice(value),
        b"retry" => {}
        _ => {}
    }
}

fn trimmed_to_string(value: &[u8]) -> String {
    let value = value.strip_suffix(b"\n").unwrap_or(value);
    String::from_utf8_lossy(value).into_owned()
}
