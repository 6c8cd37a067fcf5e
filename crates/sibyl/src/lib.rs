#![forbid(unsafe_code)]

//! Client for remote prediction jobs.
//!
//! Predictions run asynchronously on the service and can stream their
//! progress over SSE. [`Client`] covers the request/response surface
//! (with method-aware retries) and hands out streaming views:
//! [`Client::stream_events`] for raw events, [`Client::stream_text`] for
//! the output as bytes, [`Client::stream_files`] for output files.

mod client;
mod error;
mod prediction;

pub use sibyl_net::{
    ApiError, Backoff, ConstantBackoff, ExponentialBackoff, Headers, NetOptions, RetryPolicy,
};
pub use sibyl_sse::{Event, EventStream, SseError};
pub use sibyl_stream::{File, FileStream, StreamError, TextStream};

pub use crate::{
    client::{Client, ClientBuilder},
    error::{Error, Result},
    prediction::{Prediction, Status},
};
