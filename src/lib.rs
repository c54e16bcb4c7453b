//! Monitor API service library.
//!
//! The service is a thin HTTP layer around a per-module logging facility:
//! named loggers built on first use, each writing to stdout or to a rotating
//! JSON file plus one plain file per severity.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod log;

pub use config::MonitorConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, Startup};
pub use log::{get_logger, LoggerRegistry, NamedLogger};
