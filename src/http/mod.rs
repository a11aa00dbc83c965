//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → Upgrade: websocket?
//!         yes → websocket.rs (announce, handshake, echo loop)
//!         no  → request.rs (URL, headers, body → RequestSnapshot)
//!               → relay (format + dispatch)
//!               → response.rs (outcome → status + body)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use server::{AppState, HttpServer, InnerState};
pub use websocket::{EchoBridge, SessionId, SessionObserver, SessionState, TracingObserver};
