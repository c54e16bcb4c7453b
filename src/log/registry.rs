//! Process-wide map from logger name to logger.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ServerConfig;
use crate::log::error::LogError;
use crate::log::logger::NamedLogger;
use crate::log::rotate::{RotatingFileSink, RotationPolicy};
use crate::log::severity::Severity;
use crate::log::sink::{ConsoleSink, Encoding, SeverityFileSink, Sink};

pub const DEFAULT_LOG_DIR: &str = "monitor-api-logs";
pub const DEFAULT_BASE_NAME: &str = "monitor-api-all";

/// Settings read once when a logger is first built.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Minimum severity written by every logger.
    pub level: Severity,
    /// Write to files under `log_dir` instead of stdout.
    pub write_log: bool,
    pub log_dir: PathBuf,
    /// The shared file is `<base_name>.log`.
    pub base_name: String,
    pub rotation: RotationPolicy,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            write_log: false,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            base_name: DEFAULT_BASE_NAME.to_string(),
            rotation: RotationPolicy::default(),
        }
    }
}

impl LogSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            level: config.log_level,
            write_log: config.write_log,
            log_dir: PathBuf::from(&config.log_dir),
            ..Self::default()
        }
    }

    pub fn link_file_name(&self) -> String {
        format!("{}.log", self.base_name)
    }
}

/// File destinations shared by every file-backed logger.
struct FileSinks {
    rotating: Arc<dyn Sink>,
    split: Arc<dyn Sink>,
}

#[derive(Default)]
struct State {
    loggers: HashMap<String, Arc<NamedLogger>>,
    files: Option<FileSinks>,
}

/// Registry of named loggers, one instance per name for its lifetime.
///
/// Lookups and first-time construction happen under one lock, so concurrent
/// first calls for a name all receive the same logger and no file is opened
/// twice. Entries are never removed.
pub struct LoggerRegistry {
    settings: LogSettings,
    console: Arc<dyn Sink>,
    file_echo: Arc<dyn Sink>,
    state: Mutex<State>,
}

impl LoggerRegistry {
    pub fn new(settings: LogSettings) -> Self {
        Self {
            settings,
            console: Arc::new(ConsoleSink::stdout()),
            file_echo: Arc::new(ConsoleSink::stderr()),
            state: Mutex::new(State::default()),
        }
    }

    /// Replace the stdout destination used by console loggers.
    pub fn with_console(mut self, console: Arc<dyn Sink>) -> Self {
        self.console = console;
        self
    }

    /// Replace the stderr destination that file-backed loggers also echo to.
    pub fn with_file_echo(mut self, echo: Arc<dyn Sink>) -> Self {
        self.file_echo = echo;
        self
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    /// Return the logger for `name`, building it on first use.
    ///
    /// `name` must not be empty. `force_console` only matters for the call
    /// that builds the logger. Nothing is cached when construction fails.
    pub fn try_get_logger(&self, name: &str, force_console: bool) -> Result<Arc<NamedLogger>, LogError> {
        debug_assert!(!name.is_empty(), "logger name must not be empty");

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = state.loggers.get(name) {
            return Ok(Arc::clone(logger));
        }

        let sinks = if self.settings.write_log && !force_console {
            let files = match state.files.take() {
                Some(files) => files,
                None => self.open_files()?,
            };
            let sinks = vec![
                Arc::clone(&self.file_echo),
                Arc::clone(&files.rotating),
                Arc::clone(&files.split),
            ];
            state.files = Some(files);
            sinks
        } else {
            vec![Arc::clone(&self.console)]
        };

        let logger = Arc::new(NamedLogger::new(name, self.settings.level, sinks));
        state.loggers.insert(name.to_string(), Arc::clone(&logger));
        Ok(logger)
    }

    /// Like [`try_get_logger`](Self::try_get_logger), but a logger that
    /// cannot be built ends the process with a message naming the failed path.
    pub fn get_logger(&self, name: &str, force_console: bool) -> Arc<NamedLogger> {
        match self.try_get_logger(name, force_console) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("fatal: logger {:?}: {}", name, e);
                std::process::exit(1);
            }
        }
    }

    /// Number of loggers built so far.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn open_files(&self) -> Result<FileSinks, LogError> {
        let dir = &self.settings.log_dir;
        fs::create_dir_all(dir).map_err(|source| LogError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let rotating = RotatingFileSink::open(
            dir,
            &self.settings.link_file_name(),
            self.settings.rotation.clone(),
            Encoding::Json,
        )?;
        let split = SeverityFileSink::open(dir, Encoding::Text)?;

        Ok(FileSinks {
            rotating: Arc::new(rotating),
            split: Arc::new(split),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn file_settings(dir: &std::path::Path) -> LogSettings {
        LogSettings {
            write_log: true,
            log_dir: dir.join("logs"),
            ..LogSettings::default()
        }
    }

    #[test]
    fn test_same_name_same_instance() {
        let registry = LoggerRegistry::new(LogSettings::default());
        let a = registry.get_logger("api", false);
        let b = registry.get_logger("api", true);
        let c = registry.get_logger("ws", false);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(LoggerRegistry::new(file_settings(dir.path())));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.try_get_logger("shared", false).unwrap())
            })
            .collect();
        let loggers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(loggers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_file_mode_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let settings = file_settings(dir.path());
        let log_dir = settings.log_dir.clone();
        let registry = LoggerRegistry::new(settings);

        let log = registry.try_get_logger("files", false).unwrap();
        log.info("hello", &[]);
        log.flush();

        for name in ["debug.log", "info.log", "warn.log", "error.log", "fatal.log"] {
            assert!(log_dir.join(name).is_file(), "{} missing", name);
        }
        let shared = fs::read_to_string(log_dir.join("monitor-api-all.log")).unwrap();
        assert!(shared.contains("\"msg\":\"hello\""));
        assert!(fs::read_to_string(log_dir.join("info.log")).unwrap().contains("msg=hello"));
    }

    #[test]
    fn test_force_console_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = file_settings(dir.path());
        let log_dir = settings.log_dir.clone();
        let registry = LoggerRegistry::new(settings);

        let log = registry.try_get_logger("console-only", true).unwrap();
        log.info("to stdout", &[]);
        assert!(!log_dir.exists());
    }

    #[test]
    fn test_construction_failure_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let registry = LoggerRegistry::new(LogSettings {
            write_log: true,
            log_dir: blocker.join("logs"),
            ..LogSettings::default()
        });

        let err = registry.try_get_logger("broken", false).unwrap_err();
        assert!(matches!(err, LogError::CreateDir { .. }));
        assert!(err.to_string().contains("blocker"));
        assert!(registry.is_empty());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "logger name must not be empty")]
    fn test_empty_name_asserts_in_debug() {
        let registry = LoggerRegistry::new(LogSettings::default());
        let _ = registry.try_get_logger("", false);
    }

    #[test]
    fn test_settings_from_config() {
        let config = ServerConfig {
            log_level: Severity::Warn,
            write_log: true,
            log_dir: "/var/log/monitor".to_string(),
            ..ServerConfig::default()
        };
        let settings = LogSettings::from_config(&config);
        assert_eq!(settings.level, Severity::Warn);
        assert!(settings.write_log);
        assert_eq!(settings.log_dir, PathBuf::from("/var/log/monitor"));
        assert_eq!(settings.link_file_name(), "monitor-api-all.log");
    }
}
