#![forbid(unsafe_code)]

//! Consumer-facing projections over the SSE transport.
//!
//! - [`TextStream`]: the output events of a prediction as a byte stream
//!   (or a `tokio::io::AsyncRead` via [`TextStream::into_reader`])
//! - [`FileStream`]: the output events as a sequence of [`File`] handles,
//!   inline (data URI) or lazily fetched (http/https URL)

mod data_uri;
mod error;
mod file;
mod text;
mod value;

pub use crate::{
    data_uri::{DataUri, DataUriError},
    error::StreamError,
    file::{File, FileStream},
    text::TextStream,
    value::{classify, file_candidates, FileSourceKind},
};
