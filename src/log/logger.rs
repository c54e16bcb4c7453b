//! The caller-facing logger handle.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::log::caller::CallSite;
use crate::log::format::{self, Template};
use crate::log::record::Record;
use crate::log::severity::Severity;
use crate::log::sink::Sink;

/// A named logger with a fixed threshold and a fixed set of sinks.
///
/// Obtained from [`LoggerRegistry`](crate::log::LoggerRegistry); neither the
/// threshold nor the sinks change after construction.
///
/// Two calling conventions exist per severity. `info("count=%d", &[&n])`
/// resolves a printf-style template (see [`format`]), while
/// `infoln(&[&"count", &n])` joins its operands with spaces.
///
/// `fatal` and `panic` write their record and hand back an [`Escalation`]
/// instead of ending the process themselves.
pub struct NamedLogger {
    name: String,
    level: Severity,
    sinks: Vec<Arc<dyn Sink>>,
}

impl fmt::Debug for NamedLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedLogger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("sinks", &self.sinks.iter().map(|s| s.describe()).collect::<Vec<_>>())
            .finish()
    }
}

impl NamedLogger {
    pub fn new(name: impl Into<String>, level: Severity, sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self {
            name: name.into(),
            level,
            sinks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum severity that gets written.
    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.level
    }

    /// Templated call at an explicit severity.
    #[track_caller]
    pub fn log(&self, severity: Severity, template: impl Into<Template>, args: &[&dyn Display]) {
        let site = CallSite::capture();
        if self.enabled(severity) {
            let message = format::resolve(&template.into(), args);
            self.dispatch(severity, &message, site);
        }
    }

    /// Line call at an explicit severity.
    #[track_caller]
    pub fn logln(&self, severity: Severity, args: &[&dyn Display]) {
        let site = CallSite::capture();
        if self.enabled(severity) {
            let message = format::sprintln(args);
            self.dispatch(severity, &message, site);
        }
    }

    #[track_caller]
    pub fn debug(&self, template: impl Into<Template>, args: &[&dyn Display]) {
        self.log(Severity::Debug, template, args)
    }

    #[track_caller]
    pub fn info(&self, template: impl Into<Template>, args: &[&dyn Display]) {
        self.log(Severity::Info, template, args)
    }

    /// Same as [`info`](Self::info).
    #[track_caller]
    pub fn print(&self, template: impl Into<Template>, args: &[&dyn Display]) {
        self.log(Severity::Info, template, args)
    }

    #[track_caller]
    pub fn warn(&self, template: impl Into<Template>, args: &[&dyn Display]) {
        self.log(Severity::Warn, template, args)
    }

    #[track_caller]
    pub fn error(&self, template: impl Into<Template>, args: &[&dyn Display]) {
        self.log(Severity::Error, template, args)
    }

    #[track_caller]
    pub fn debugln(&self, args: &[&dyn Display]) {
        self.logln(Severity::Debug, args)
    }

    #[track_caller]
    pub fn infoln(&self, args: &[&dyn Display]) {
        self.logln(Severity::Info, args)
    }

    /// Same as [`infoln`](Self::infoln).
    #[track_caller]
    pub fn println(&self, args: &[&dyn Display]) {
        self.logln(Severity::Info, args)
    }

    #[track_caller]
    pub fn warnln(&self, args: &[&dyn Display]) {
        self.logln(Severity::Warn, args)
    }

    #[track_caller]
    pub fn errorln(&self, args: &[&dyn Display]) {
        self.logln(Severity::Error, args)
    }

    /// Write a fatal record. The returned signal must be honoured by the
    /// caller, usually with [`Escalation::terminate`].
    #[track_caller]
    pub fn fatal(&self, template: impl Into<Template>, args: &[&dyn Display]) -> Escalation {
        let message = format::resolve(&template.into(), args);
        self.escalate(Severity::Fatal, message, CallSite::capture())
    }

    #[track_caller]
    pub fn fatalln(&self, args: &[&dyn Display]) -> Escalation {
        let message = format::sprintln(args);
        self.escalate(Severity::Fatal, message, CallSite::capture())
    }

    /// Write a panic record and return the matching signal.
    #[track_caller]
    pub fn panic(&self, template: impl Into<Template>, args: &[&dyn Display]) -> Escalation {
        let message = format::resolve(&template.into(), args);
        self.escalate(Severity::Panic, message, CallSite::capture())
    }

    #[track_caller]
    pub fn panicln(&self, args: &[&dyn Display]) -> Escalation {
        let message = format::sprintln(args);
        self.escalate(Severity::Panic, message, CallSite::capture())
    }

    /// Flush every sink, reporting failures on stderr.
    pub fn flush(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                report_failure(&self.name, sink.as_ref(), &e);
            }
        }
    }

    fn escalate(&self, severity: Severity, mut message: String, site: CallSite) -> Escalation {
        if self.enabled(severity) {
            self.dispatch(severity, &message, site);
        }
        self.flush();

        if message.ends_with('\n') {
            message.pop();
        }
        let logger = self.name.clone();
        match severity {
            Severity::Panic => Escalation::Panic { logger, message },
            _ => Escalation::Fatal { logger, message },
        }
    }

    fn dispatch(&self, severity: Severity, message: &str, site: CallSite) {
        let record = Record::new(severity, &self.name, message, site);
        for sink in &self.sinks {
            if !sink.accepts(severity) {
                continue;
            }
            if let Err(e) = sink.write_record(&record) {
                report_failure(&self.name, sink.as_ref(), &e);
            }
        }
    }
}

fn report_failure(logger: &str, sink: &dyn Sink, err: &std::io::Error) {
    eprintln!("log {}: write to {} failed: {}", logger, sink.describe(), err);
}

/// Abnormal termination requested by a `fatal` or `panic` call.
///
/// The record is already written and flushed when this is returned.
#[must_use = "a fatal or panic log call requests termination"]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Escalation {
    #[error("fatal in {logger}: {message}")]
    Fatal { logger: String, message: String },

    #[error("panic in {logger}: {message}")]
    Panic { logger: String, message: String },
}

impl Escalation {
    pub fn message(&self) -> &str {
        match self {
            Escalation::Fatal { message, .. } | Escalation::Panic { message, .. } => message,
        }
    }

    /// Exit with status 1 for `Fatal`, unwind with a Rust panic for `Panic`.
    pub fn terminate(self) -> ! {
        match self {
            Escalation::Fatal { .. } => std::process::exit(1),
            Escalation::Panic { message, .. } => panic!("{}", message),
        }
    }
}
