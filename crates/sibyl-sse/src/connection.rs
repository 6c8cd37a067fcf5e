use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use sibyl_net::{ByteStream, NetError};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::trace;

/// Bounded capacity decoupling the socket from a slow consumer.
const CHANNEL_CAPACITY: usize = 16;

/// One live SSE connection.
///
/// A dedicated reader task pulls chunks off the response body and feeds a
/// bounded channel; dropping the connection aborts the task, so it can
/// never outlive the transport that spawned it.
#[derive(Debug)]
pub(crate) struct Connection {
    rx: mpsc::Receiver<Result<Bytes, NetError>>,
    task: JoinHandle<()>,
}

impl Connection {
    pub(crate) fn spawn(mut body: ByteStream) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(async move {
            while let Some(item) = body.next().await {
                if tx.send(item).await.is_err() {
                    trace!("connection consumer dropped; stopping reader");
                    return;
                }
            }
            trace!("connection body ended");
        });
        Self { rx, task }
    }
}

impl Stream for Connection {
    type Item = Result<Bytes, NetError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.task.abort();
    }
}
