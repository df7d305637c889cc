//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign / propagate request ID)
//!     → handlers.rs (decode JSON, log, build envelope)
//!     → response.rs (envelope or error body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ApiError, ErrorBody, ReceivedEnvelope, RECEIVED_MESSAGE};
pub use server::{AppState, EchoServer};
