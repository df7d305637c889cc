//! Network layer.
//!
//! # Data Flow
//! ```text
//! ListenerConfig.bind_address
//!     → listener.rs (parse, bind)
//!     → tokio TcpListener handed to EchoServer::run
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
