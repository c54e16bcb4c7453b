//! Logging facility errors.

use std::io;
use std::path::PathBuf;

/// Failures while building a logger's destinations.
///
/// These only surface at construction time. Once a logger exists, write
/// failures are reported on stderr and never returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("creating log directory {} failed: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("opening log file {} failed: {source}", path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("linking {} to the current log file failed: {source}", path.display())]
    Link { path: PathBuf, source: io::Error },
}
