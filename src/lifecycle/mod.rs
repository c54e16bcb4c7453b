//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → LoggerRegistry → HTTP server → websocket bridge (optional)
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → broadcast → HTTP server drains and exits
//! ```
//!
//! # Design Decisions
//! - The HTTP server starts first; the bridge never delays it
//! - A bridge that is disabled or fails is logged, not fatal

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Bridge, BridgeOutcome, Startup};
