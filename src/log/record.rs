//! Log records and their two encodings.

use std::fmt::Write;

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;

use crate::log::caller::CallSite;
use crate::log::severity::Severity;

/// A single resolved log call on its way to the sinks.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub time: DateTime<Local>,
    pub severity: Severity,
    pub logger: &'a str,
    pub message: &'a str,
    pub site: CallSite,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    time: String,
    level: &'static str,
    msg: &'a str,
    logger: &'a str,
    file: &'static str,
    line: u32,
}

impl<'a> Record<'a> {
    pub fn new(severity: Severity, logger: &'a str, message: &'a str, site: CallSite) -> Self {
        Self {
            time: Local::now(),
            severity,
            logger,
            message: message.strip_suffix('\n').unwrap_or(message),
            site,
        }
    }

    fn timestamp(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// One JSON object terminated by a newline.
    pub fn to_json_line(&self) -> String {
        let json = JsonRecord {
            time: self.timestamp(),
            level: self.severity.as_str(),
            msg: self.message,
            logger: self.logger,
            file: self.site.file,
            line: self.site.line,
        };
        // a struct of strings and integers always serializes
        let mut line = serde_json::to_string(&json).unwrap_or_default();
        line.push('\n');
        line
    }

    /// `key=value` pairs terminated by a newline, values quoted when needed.
    pub fn to_text_line(&self) -> String {
        let mut line = String::with_capacity(self.message.len() + 96);
        push_pair(&mut line, "time", &self.timestamp());
        line.push(' ');
        push_pair(&mut line, "level", self.severity.as_str());
        line.push(' ');
        push_pair(&mut line, "msg", self.message);
        line.push(' ');
        push_pair(&mut line, "logger", self.logger);
        line.push(' ');
        push_pair(&mut line, "file", self.site.file);
        let _ = write!(line, " line={}", self.site.line);
        line.push('\n');
        line
    }
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    if needs_quoting(value) {
        let _ = write!(out, "{:?}", value);
    } else {
        out.push_str(value);
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
}
