//! Shared utilities for integration tests.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use monitor_api::log::sink::{ConsoleSink, Encoding, Sink};
use monitor_api::log::{LogSettings, Severity};

/// In-memory stream standing in for stdout/stderr.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl Captured {
    pub fn sink(&self, encoding: Encoding) -> Arc<dyn Sink> {
        Arc::new(ConsoleSink::new("captured", encoding, self.clone()))
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Every captured line parsed as a JSON record.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.text()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad line {:?}: {}", l, e)))
            .collect()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// File-mode settings rooted in `dir`.
#[allow(dead_code)]
pub fn file_settings(dir: &Path, level: Severity) -> LogSettings {
    LogSettings {
        level,
        write_log: true,
        log_dir: dir.join("logs"),
        ..LogSettings::default()
    }
}
