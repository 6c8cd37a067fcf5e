#![forbid(unsafe_code)]

//! HTTP plumbing for sibyl.
//!
//! - [`HttpClient`]: thin reqwest wrapper speaking the [`Net`] trait
//! - [`Backoff`] strategies shared by the retry layer and the SSE transport
//! - [`RetryNet`]: method-aware retry decorator for request/response calls

mod api_error;
mod backoff;
mod client;
mod error;
mod retry;
mod types;

pub use reqwest::Method;

pub use crate::{
    api_error::ApiError,
    backoff::{Backoff, ConstantBackoff, ExponentialBackoff},
    client::{ByteStream, HttpClient, NetResponse},
    error::{NetError, NetResult},
    retry::{Net, NetExt, RetryNet},
    types::{Headers, NetOptions, RetryPolicy},
};
