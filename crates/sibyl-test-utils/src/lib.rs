#![forbid(unsafe_code)]

//! Shared async HTTP fixtures for sibyl integration tests.

mod http_server;

pub use http_server::TestHttpServer;
