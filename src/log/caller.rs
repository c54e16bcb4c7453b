//! Call-site enrichment.
//!
//! Every public logging method is `#[track_caller]`, so the location seen
//! here is the caller's line rather than a frame inside this module. No
//! stack walk happens on the logging path; the compiler threads the
//! location through the annotated frames.

use std::fmt;
use std::panic::Location;

/// Source location of the log call that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// Location of the closest caller not annotated with `#[track_caller]`.
    #[track_caller]
    pub fn capture() -> Self {
        Location::caller().into()
    }

    /// File name without its directory.
    pub fn short_file(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
