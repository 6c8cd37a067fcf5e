use sibyl_net::{Headers, HttpClient, Net, NetError, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::{
    connection::Connection,
    decoder::Decoder,
    error::{DecodeError, SseError, SseResult},
    event::Event,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Done,
    Cancelled,
    Failed,
}

/// Resilient SSE transport over one remote endpoint.
///
/// Owns at most one connection at a time. When the byte stream ends before
/// the terminal `done` event, it reconnects with backoff, sending
/// `Last-Event-ID` so the server resumes after the last event already
/// handed to the caller. Events are never redelivered: the id only
/// advances on delivery, not on raw receipt.
///
/// One logical caller at a time; `next_event` is the sole suspension
/// point and reacts to the cancellation token while reading and while
/// backing off.
#[derive(Debug)]
pub struct EventStream {
    client: HttpClient,
    url: Url,
    extra_headers: Headers,
    policy: RetryPolicy,
    cancel: CancellationToken,
    skip_heartbeats: bool,

    last_event_id: String,
    attempt: u32,
    phase: Phase,
    conn: Option<Decoder<Connection>>,
}

impl EventStream {
    pub fn new(client: HttpClient, url: Url) -> Self {
        Self {
            client,
            url,
            extra_headers: Headers::new(),
            policy: RetryPolicy::default(),
            cancel: CancellationToken::new(),
            skip_heartbeats: true,
            last_event_id: String::new(),
            attempt: 0,
            phase: Phase::Active,
            conn: None,
        }
    }

    /// Reconnect budget and backoff. `max_retries == 0` reconnects
    /// without bound.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Headers added to every (re)connect request.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.extra_headers = headers;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Whether comment-only / empty blocks are filtered out (the default)
    /// or surfaced as zero-value events.
    #[must_use]
    pub fn skip_heartbeats(mut self, skip: bool) -> Self {
        self.skip_heartbeats = skip;
        self
    }

    /// Id of the last event delivered to the caller, if any.
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// Next decoded event. `Ok(None)` after the terminal `done` event.
    ///
    /// Reconnects transparently on connection loss. Invalid-UTF-8 framing
    /// errors are returned without ending the stream; all other errors are
    /// terminal.
    pub async fn next_event(&mut self) -> SseResult<Option<Event>> {
        loop {
            match self.phase {
                Phase::Done => return Ok(None),
                Phase::Cancelled => return Err(SseError::Cancelled),
                Phase::Failed => return Err(SseError::Closed),
                Phase::Active => {}
            }

            if self.conn.is_none() {
                self.connect().await?;
            }
            let Some(decoder) = self.conn.as_mut() else {
                continue;
            };

            let next = tokio::select! {
                () = self.cancel.cancelled() => None,
                next = decoder.next() => Some(next),
            };
            let Some(next) = next else {
                self.phase = Phase::Cancelled;
                self.conn = None;
                return Err(SseError::Cancelled);
            };

            match next {
                Ok(Some(event)) => {
                    if self.skip_heartbeats && event.is_negligible() {
                        trace!("skipping negligible event");
                        continue;
                    }
                    if !event.id.is_empty() {
                        self.last_event_id = event.id.clone();
                    }
                    if event.is_done() {
                        debug!("terminal event received");
                        self.phase = Phase::Done;
                        self.conn = None;
                    }
                    return Ok(Some(event));
                }
                Ok(None) => {
                    debug!("stream ended before terminal event; reconnecting");
                    self.conn = None;
                }
                Err(DecodeError::UnexpectedEof) => {
                    debug!("stream cut mid-block; reconnecting");
                    self.conn = None;
                }
                Err(DecodeError::Connection(err)) => {
                    debug!(error = %err, "connection lost; reconnecting");
                    self.conn = None;
                }
                Err(DecodeError::InvalidUtf8) => {
                    // framing error: the block is consumed, the connection
                    // stays up
                    return Err(SseError::InvalidUtf8);
                }
            }
        }
    }

    /// Release the active connection and end the stream. Idempotent.
    pub fn close(&mut self) {
        self.conn = None;
        if self.phase == Phase::Active {
            self.phase = Phase::Done;
        }
    }

    async fn connect(&mut self) -> SseResult<()> {
        if self.policy.max_retries > 0 && self.attempt > self.policy.max_retries {
            self.phase = Phase::Failed;
            return Err(SseError::RetryExhausted {
                attempts: self.attempt,
            });
        }

        if self.attempt > 0 {
            let delay = self.policy.backoff.next_delay(self.attempt - 1);
            debug!(
                attempt = self.attempt,
                delay_ms = delay.as_millis() as u64,
                "backing off before reconnect"
            );
            let cancelled = tokio::select! {
                () = self.cancel.cancelled() => true,
                () = tokio::time::sleep(delay) => false,
            };
            if cancelled {
                self.phase = Phase::Cancelled;
                return Err(SseError::Cancelled);
            }
        }

        let mut headers = self.extra_headers.clone();
        headers.insert("Accept", "text/event-stream");
        headers.insert("Cache-Control", "no-cache");
        headers.insert("Connection", "keep-alive");
        if !self.last_event_id.is_empty() {
            headers.insert("Last-Event-ID", self.last_event_id.clone());
        }

        let opened = tokio::select! {
            () = self.cancel.cancelled() => None,
            opened = self.client.stream(self.url.clone(), headers) => Some(opened),
        };

        let body = match opened {
            None => {
                self.phase = Phase::Cancelled;
                return Err(SseError::Cancelled);
            }
            Some(Ok(body)) => body,
            Some(Err(NetError::Api(api))) => {
                self.phase = Phase::Failed;
                return Err(SseError::Status(api));
            }
            Some(Err(other)) => {
                self.phase = Phase::Failed;
                return Err(SseError::Net(other));
            }
        };

        self.attempt += 1;
        self.conn = Some(Decoder::new(Connection::spawn(body)));
        Ok(())
    }
}
