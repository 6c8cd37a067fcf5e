use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::Method;
use url::Url;

use crate::{
    api_error::ApiError,
    error::{NetError, NetResult},
    retry::Net,
    types::{Headers, NetOptions},
};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, NetError>> + Send>>;

/// Thin reqwest wrapper. Cheap to clone; safe to share across independent
/// transports and request layers.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    options: NetOptions,
}

/// Fully buffered response from a non-streaming request.
#[derive(Debug, Clone)]
pub struct NetResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl HttpClient {
    pub fn new(options: NetOptions) -> NetResult<Self> {
        let inner = reqwest::Client::builder()
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .build()
            .map_err(|e| NetError::Request(e.to_string()))?;
        Ok(Self { inner, options })
    }

    /// Wrap an existing reqwest client, e.g. one injected by the caller.
    pub fn from_reqwest(inner: reqwest::Client, options: NetOptions) -> Self {
        Self { inner, options }
    }

    fn apply_headers(
        mut req: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        for (k, v) in headers.iter() {
            req = req.header(k, v);
        }
        req
    }

    fn collect_headers(resp: &reqwest::Response) -> Headers {
        let mut out = Headers::new();
        for (name, value) in resp.headers() {
            if let Ok(v) = value.to_str() {
                out.insert(name.as_str(), v);
            }
        }
        out
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: Headers,
        body: Option<Bytes>,
    ) -> NetResult<NetResponse> {
        let mut req = self
            .inner
            .request(method, url)
            .timeout(self.options.request_timeout);
        req = Self::apply_headers(req, &headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(|e| NetError::request(&e))?;
        let status = resp.status().as_u16();
        let resp_headers = Self::collect_headers(&resp);
        let body = resp.bytes().await.map_err(|e| NetError::request(&e))?;

        if status >= 400 {
            return Err(NetError::Api(ApiError::from_response(
                status,
                &resp_headers,
                &body,
            )));
        }

        Ok(NetResponse {
            status,
            headers: resp_headers,
            body,
        })
    }

    async fn stream(&self, url: Url, headers: Headers) -> NetResult<ByteStream> {
        // No overall timeout: streams stay open for as long as the remote
        // job runs.
        let mut req = self.inner.get(url);
        req = Self::apply_headers(req, &headers);

        let resp = req.send().await.map_err(|e| NetError::request(&e))?;
        let status = resp.status();

        // An SSE stream rides on a 200 exactly; a 204 or 206 cannot carry
        // a live event stream.
        if status.as_u16() != 200 {
            let resp_headers = Self::collect_headers(&resp);
            let body = resp.bytes().await.unwrap_or_default();
            return Err(NetError::Api(ApiError::from_response(
                status.as_u16(),
                &resp_headers,
                &body,
            )));
        }

        let stream = resp.bytes_stream().map_err(|e| NetError::request(&e));
        Ok(Box::pin(stream))
    }
}
