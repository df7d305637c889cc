//! Data receiver library.
//!
//! An HTTP service with one job: accept any JSON document on
//! `POST /send-data`, log it, and answer with
//! `{"message": "Data received successfully", "received": <document>}`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServiceConfig;
pub use http::EchoServer;
pub use lifecycle::Shutdown;
