use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::backoff::{Backoff, ExponentialBackoff};

/// Case-sensitive header map handed to the client on each request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<HashMap<String, String>> for Headers {
    fn from(map: HashMap<String, String>) -> Self {
        Self { inner: map }
    }
}

/// Retry configuration shared by the request layer and the SSE transport.
///
/// For the request layer `max_retries` is the number of retries after the
/// first attempt. The SSE transport additionally treats `0` as unbounded.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Arc<dyn Backoff>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: impl Backoff + 'static) -> Self {
        Self {
            max_retries,
            backoff: Arc::new(backoff),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Arc::new(ExponentialBackoff::default()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NetOptions {
    /// Timeout for non-streaming requests. Streaming bodies are exempt.
    pub request_timeout: Duration,
    /// Max idle connections per host kept by the pool.
    pub pool_max_idle_per_host: usize,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 2,
        }
    }
}
