//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace layer)
//!     → handlers.rs (ping / pong / kong / long_async)
//!     → "api-handlers" logger
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
