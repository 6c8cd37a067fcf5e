use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

use crate::{
    client::{ByteStream, NetResponse},
    error::{NetError, NetResult},
    types::{Headers, RetryPolicy},
};

/// Request execution seam. `HttpClient` is the real implementation;
/// decorators and test doubles wrap it.
#[async_trait]
pub trait Net: Send + Sync {
    /// Execute one buffered request/response exchange.
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: Headers,
        body: Option<Bytes>,
    ) -> NetResult<NetResponse>;

    /// Open a streaming GET and hand back the body as a byte stream.
    async fn stream(&self, url: Url, headers: Headers) -> NetResult<ByteStream>;
}

/// Retry decorator for non-streaming requests.
///
/// GET is retried on 429 and any 5xx. Other methods may have side effects,
/// so they are retried on 429 only and a transient 5xx is surfaced
/// immediately. A `Retry-After` header overrides the computed backoff
/// delay. Transport failures are never retried.
#[derive(Debug)]
pub struct RetryNet<N> {
    inner: N,
    policy: RetryPolicy,
}

impl<N: Net> RetryNet<N> {
    pub fn new(inner: N, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

fn should_retry(method: &Method, status: u16) -> bool {
    if *method == Method::GET {
        status == 429 || (500..600).contains(&status)
    } else {
        status == 429
    }
}

#[async_trait]
impl<N: Net> Net for RetryNet<N> {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: Headers,
        body: Option<Bytes>,
    ) -> NetResult<NetResponse> {
        let mut attempt: u32 = 0;
        loop {
            let result = self
                .inner
                .send(method.clone(), url.clone(), headers.clone(), body.clone())
                .await;

            let api = match result {
                Ok(resp) => return Ok(resp),
                Err(NetError::Api(api)) => api,
                // Bare transport failure: report as-is, no blind retry.
                Err(other) => return Err(other),
            };

            if !should_retry(&method, api.status) || attempt >= self.policy.max_retries {
                return Err(NetError::Api(api));
            }

            let delay = api
                .retry_after
                .unwrap_or_else(|| self.policy.backoff.next_delay(attempt));
            debug!(
                status = api.status,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );
            if !delay.is_zero() {
                sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn stream(&self, url: Url, headers: Headers) -> NetResult<ByteStream> {
        // Stream resilience lives in the SSE transport, not here.
        self.inner.stream(url, headers).await
    }
}

pub trait NetExt: Net + Sized {
    /// Add the method-aware retry layer.
    fn with_retry(self, policy: RetryPolicy) -> RetryNet<Self> {
        RetryNet::new(self, policy)
    }
}

impl<T: Net> NetExt for T {}
