//! Record destinations.
//!
//! A sink owns its writer behind a mutex and encodes a record into a full
//! line before taking the lock, so one `write_all` per record keeps
//! concurrent callers from interleaving mid-line.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::log::error::LogError;
use crate::log::record::Record;
use crate::log::severity::Severity;

/// Line encoding used by a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One JSON object per line.
    Json,
    /// Human-readable `key=value` pairs.
    Text,
}

impl Encoding {
    pub fn encode(self, record: &Record<'_>) -> String {
        match self {
            Encoding::Json => record.to_json_line(),
            Encoding::Text => record.to_text_line(),
        }
    }
}

/// A destination for log records.
pub trait Sink: Send + Sync {
    /// Whether records of `severity` are routed here at all.
    fn accepts(&self, _severity: Severity) -> bool {
        true
    }

    fn write_record(&self, record: &Record<'_>) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Short label used when reporting a failed write.
    fn describe(&self) -> String;
}

/// Writes encoded records to a stream such as stdout or stderr.
pub struct ConsoleSink {
    label: &'static str,
    encoding: Encoding,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new(label: &'static str, encoding: Encoding, out: impl Write + Send + 'static) -> Self {
        Self {
            label,
            encoding,
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new("stdout", Encoding::Text, io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new("stderr", Encoding::Text, io::stderr())
    }
}

impl Sink for ConsoleSink {
    fn write_record(&self, record: &Record<'_>) -> io::Result<()> {
        let line = self.encoding.encode(record);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }

    fn describe(&self) -> String {
        self.label.to_string()
    }
}

struct SplitFile {
    severity: Severity,
    path: PathBuf,
    file: Mutex<File>,
}

/// One plain, non-rotating file per severity (`debug.log` .. `fatal.log`).
pub struct SeverityFileSink {
    encoding: Encoding,
    files: Vec<SplitFile>,
}

impl SeverityFileSink {
    /// Open or create every per-severity file under `dir`.
    pub fn open(dir: &Path, encoding: Encoding) -> Result<Self, LogError> {
        let files = Severity::FILE_SPLIT
            .iter()
            .map(|&(severity, name)| {
                let path = dir.join(name);
                let file = open_append(&path)?;
                Ok(SplitFile {
                    severity,
                    path,
                    file: Mutex::new(file),
                })
            })
            .collect::<Result<Vec<_>, LogError>>()?;

        Ok(Self { encoding, files })
    }

    /// Path of the file dedicated to `severity`, if it has one.
    pub fn path_for(&self, severity: Severity) -> Option<&Path> {
        self.files
            .iter()
            .find(|f| f.severity == severity)
            .map(|f| f.path.as_path())
    }
}

impl Sink for SeverityFileSink {
    fn accepts(&self, severity: Severity) -> bool {
        self.files.iter().any(|f| f.severity == severity)
    }

    fn write_record(&self, record: &Record<'_>) -> io::Result<()> {
        let Some(split) = self.files.iter().find(|f| f.severity == record.severity) else {
            return Ok(());
        };
        let line = self.encoding.encode(record);
        let mut file = split.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        for split in &self.files {
            split.file.lock().unwrap_or_else(PoisonError::into_inner).flush()?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match self.files.first().and_then(|f| f.path.parent()) {
            Some(dir) => format!("per-severity files in {}", dir.display()),
            None => "per-severity files".to_string(),
        }
    }
}

pub(crate) fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}
