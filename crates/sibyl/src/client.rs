use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use sibyl_net::{
    Headers, HttpClient, Method, Net, NetExt, NetOptions, RetryNet, RetryPolicy,
};
use sibyl_sse::EventStream;
use sibyl_stream::{FileStream, TextStream};
use tracing::debug;
use url::Url;

use crate::{
    error::{Error, Result},
    prediction::Prediction,
};

const DEFAULT_BASE_URL: &str = "https://api.sibyl.dev/v1";
const TOKEN_ENV: &str = "SIBYL_API_TOKEN";

/// Client for the prediction service.
///
/// Non-streaming calls go through the method-aware retry layer; streaming
/// calls share the same underlying HTTP client but carry their own
/// reconnect logic in [`EventStream`].
#[derive(Debug)]
pub struct Client {
    net: RetryNet<HttpClient>,
    http: HttpClient,
    base_url: Url,
    token: String,
    user_agent: String,
    policy: RetryPolicy,
}

/// All configuration is explicit; nothing is read from process globals
/// except the `SIBYL_API_TOKEN` fallback at build time.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    token: Option<String>,
    base_url: String,
    user_agent: String,
    policy: RetryPolicy,
    options: NetOptions,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: format!("sibyl/{}", env!("CARGO_PKG_VERSION")),
            policy: RetryPolicy::default(),
            options: NetOptions::default(),
        }
    }
}

impl ClientBuilder {
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Retry budget and backoff, shared by the request layer and the SSE
    /// transport.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn net_options(mut self, options: NetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Client> {
        let env_token = std::env::var(TOKEN_ENV).ok();
        self.build_with_env(env_token)
    }

    /// The env read is split out so tests can exercise the fallback
    /// without mutating process state.
    fn build_with_env(self, env_token: Option<String>) -> Result<Client> {
        let token = self
            .token
            .or(env_token)
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)?;
        let base_url =
            Url::parse(&self.base_url).map_err(|e| Error::InvalidBaseUrl(e.to_string()))?;

        let http = HttpClient::new(self.options)?;
        let net = http.clone().with_retry(self.policy.clone());

        Ok(Client {
            net,
            http,
            base_url,
            token,
            user_agent: self.user_agent,
            policy: self.policy,
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::InvalidBaseUrl(e.to_string()))
    }

    fn auth_headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization", format!("Bearer {}", self.token));
        headers.insert("User-Agent", self.user_agent.clone());
        headers
    }

    /// GET a JSON resource, retrying per the client's policy.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let resp = self
            .net
            .send(Method::GET, url, self.auth_headers(), None)
            .await?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    /// POST a JSON body and decode the JSON response. Retried on 429 only.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let mut headers = self.auth_headers();
        headers.insert("Content-Type", "application/json");
        let body = Bytes::from(serde_json::to_vec(body)?);
        debug!(%url, "POST");
        let resp = self
            .net
            .send(Method::POST, url, headers, Some(body))
            .await?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    /// Fetch one prediction resource.
    pub async fn predictions_get(&self, id: &str) -> Result<Prediction> {
        self.get_json(&format!("predictions/{id}")).await
    }

    /// Open the raw event stream for a prediction.
    ///
    /// Fails with [`Error::MissingStreamUrl`] when the resource offers no
    /// stream endpoint.
    pub fn stream_events(&self, prediction: &Prediction) -> Result<EventStream> {
        let raw = prediction
            .stream_url()
            .ok_or_else(|| Error::MissingStreamUrl(prediction.id.clone()))?;
        let url = Url::parse(raw).map_err(|e| Error::InvalidStreamUrl(e.to_string()))?;
        Ok(EventStream::new(self.http.clone(), url).with_policy(self.policy.clone()))
    }

    /// The prediction's output as an incremental byte stream.
    pub fn stream_text(&self, prediction: &Prediction) -> Result<TextStream> {
        Ok(TextStream::new(self.stream_events(prediction)?))
    }

    /// The prediction's output as a sequence of file handles.
    pub fn stream_files(&self, prediction: &Prediction) -> Result<FileStream> {
        Ok(FileStream::new(
            self.stream_events(prediction)?,
            self.http.clone(),
        ))
    }
}
