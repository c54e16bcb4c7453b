//! Per-module logging facility.
//!
//! # Data Flow
//! ```text
//! get_logger(name, force_console)
//!     → registry.rs (cached instance, or build one under the lock)
//!     → NamedLogger (threshold + sinks, fixed for life)
//!
//! logger.info(template, args) / logger.infoln(args)
//!     → caller.rs (call site via #[track_caller])
//!     → threshold check
//!     → format.rs (printf template or generic placeholders)
//!     → record.rs (timestamp, level, logger, file, line)
//!     → sink.rs / rotate.rs:
//!         console mode: stdout, text
//!         file mode:    stderr, text
//!                       <dir>/<base>.log (rotating, JSON)
//!                       <dir>/{debug,info,warn,error,fatal}.log (text)
//! ```
//!
//! # Design Decisions
//! - Settings are read when a logger is built; no runtime reconfiguration
//! - File sinks are opened once per registry and shared by all file loggers
//! - A logger that cannot open its files is a startup failure
//! - Write failures go to stderr and never reach the caller
//! - `fatal`/`panic` return an [`Escalation`] for the caller to act on

pub mod caller;
pub mod error;
pub mod format;
pub mod logger;
pub mod macros;
pub mod record;
pub mod registry;
pub mod rotate;
pub mod severity;
pub mod sink;

use std::sync::{Arc, OnceLock};

pub use caller::CallSite;
pub use error::LogError;
pub use format::Template;
pub use logger::{Escalation, NamedLogger};
pub use registry::{LogSettings, LoggerRegistry};
pub use rotate::RotationPolicy;
pub use severity::Severity;

static GLOBAL: OnceLock<Arc<LoggerRegistry>> = OnceLock::new();

/// Install the process-wide registry. Returns false if one already exists,
/// either from an earlier `init` or from a lookup made before it.
pub fn init(settings: LogSettings) -> bool {
    GLOBAL.set(Arc::new(LoggerRegistry::new(settings))).is_ok()
}

/// The process-wide registry, created with default settings on first use
/// when [`init`] was never called.
pub fn global() -> &'static Arc<LoggerRegistry> {
    GLOBAL.get_or_init(|| Arc::new(LoggerRegistry::new(LogSettings::default())))
}

/// Logger for `name` from the process-wide registry.
pub fn get_logger(name: &str, force_console: bool) -> Arc<NamedLogger> {
    global().get_logger(name, force_console)
}
