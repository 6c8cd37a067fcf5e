#![forbid(unsafe_code)]

//! Server-Sent-Events wire protocol for sibyl.
//!
//! [`Decoder`] parses blocks of `field: value` lines into [`Event`]s;
//! [`EventStream`] drives it over a remote endpoint, reconnecting with
//! `Last-Event-ID` and backoff when the connection drops before the
//! terminal `done` event.

mod connection;
mod decoder;
mod error;
mod event;
mod stream;

pub use crate::{
    decoder::Decoder,
    error::{DecodeError, SseError, SseResult},
    event::{Event, TYPE_DEFAULT, TYPE_DONE, TYPE_ERROR, TYPE_LOGS, TYPE_OUTPUT},
    stream::EventStream,
};
