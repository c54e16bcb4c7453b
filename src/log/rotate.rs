//! Time-windowed rotating file.
//!
//! # Layout
//! ```text
//! <dir>/<base>.log.<window-start>   one physical file per window
//! <dir>/<base>.log                  symlink to the live file
//! ```
//!
//! # Rotation
//! Windows are aligned to the Unix epoch. The first record whose timestamp
//! falls into a new window opens the next file, is written into it, and only
//! then is the link swapped. The swap renames a freshly made symlink over the
//! old one, so a reader following the link always finds a non-empty file.
//!
//! A janitor thread removes rotated files whose modification time is older
//! than the retention window, except the one the link points at. It exits
//! once the sink is dropped.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

use crate::log::error::LogError;
use crate::log::record::Record;
use crate::log::severity::Severity;
use crate::log::sink::{open_append, Encoding, Sink};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// When to start a new file and how long to keep old ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Length of one rotation window.
    pub window: Duration,
    /// Rotated files older than this are removed.
    pub max_age: Duration,
    /// `strftime` pattern appended to the link path to name each file.
    pub suffix: String,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            window: DAY,
            max_age: DAY,
            suffix: ".%Y%m%d%H%M".to_string(),
        }
    }
}

impl RotationPolicy {
    /// Window and retention both set to `window`, with second-resolution names.
    pub fn every(window: Duration) -> Self {
        Self {
            window,
            max_age: window,
            suffix: ".%Y%m%d%H%M%S".to_string(),
        }
    }

    fn window_secs(&self) -> i64 {
        self.window.as_secs().max(1) as i64
    }

    fn window_start(&self, timestamp: i64) -> i64 {
        timestamp - timestamp.rem_euclid(self.window_secs())
    }
}

struct Current {
    window_start: i64,
    path: PathBuf,
    file: File,
    linked: bool,
}

struct Shared {
    dir: PathBuf,
    link: PathBuf,
    policy: RotationPolicy,
    current: Mutex<Current>,
}

/// Rotating destination for the combined structured log.
pub struct RotatingFileSink {
    shared: Arc<Shared>,
    encoding: Encoding,
}

impl RotatingFileSink {
    /// Open the file for the current window under `dir` and start the janitor.
    ///
    /// `dir` must already exist.
    pub fn open(
        dir: &Path,
        file_name: &str,
        policy: RotationPolicy,
        encoding: Encoding,
    ) -> Result<Self, LogError> {
        let link = dir.join(file_name);
        let window_start = policy.window_start(Utc::now().timestamp());
        let path = rotated_path(&link, &policy.suffix, window_start);
        let file = open_append(&path)?;

        // a file left by an earlier run in this window can be linked right away
        let linked = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if linked {
            swap_link(&path, &link)?;
        }

        let shared = Arc::new(Shared {
            dir: dir.to_path_buf(),
            link,
            policy,
            current: Mutex::new(Current {
                window_start,
                path,
                file,
                linked,
            }),
        });
        spawn_janitor(Arc::downgrade(&shared));

        Ok(Self { shared, encoding })
    }

    /// Stable path that always points at the live file.
    pub fn link_path(&self) -> &Path {
        &self.shared.link
    }

    /// Path of the file currently written to.
    pub fn current_path(&self) -> PathBuf {
        self.shared.lock_current().path.clone()
    }

    /// Remove rotated files older than the retention window. Returns how many
    /// were removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.purge_expired()
    }
}

impl Shared {
    fn lock_current(&self) -> std::sync::MutexGuard<'_, Current> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, timestamp: i64, line: &[u8]) -> io::Result<()> {
        let mut current = self.lock_current();

        let window_start = self.policy.window_start(timestamp);
        if window_start > current.window_start {
            let path = rotated_path(&self.link, &self.policy.suffix, window_start);
            let file = open_append(&path).map_err(into_io)?;
            *current = Current {
                window_start,
                path,
                file,
                linked: false,
            };
        }

        current.file.write_all(line)?;
        if !current.linked {
            current.file.flush()?;
            swap_link(&current.path, &self.link).map_err(into_io)?;
            current.linked = true;
        }
        Ok(())
    }

    fn purge_expired(&self) -> usize {
        let current = self.lock_current().path.clone();
        // after a restart the link may still name a file from an earlier window
        let linked = fs::read_link(&self.link).ok().map(|target| self.dir.join(target));
        let Some(prefix) = self
            .link
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| format!("{}.", n))
        else {
            return 0;
        };

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("log janitor: reading {} failed: {}", self.dir.display(), e);
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_rotated = entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(&prefix));
            if !is_rotated || path == current || linked.as_ref() == Some(&path) {
                continue;
            }
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let expired = meta
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .is_some_and(|age| age > self.policy.max_age);
            if expired {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => eprintln!("log janitor: removing {} failed: {}", path.display(), e),
                }
            }
        }
        removed
    }
}

impl Sink for RotatingFileSink {
    fn accepts(&self, severity: Severity) -> bool {
        severity.is_file_routed()
    }

    fn write_record(&self, record: &Record<'_>) -> io::Result<()> {
        let line = self.encoding.encode(record);
        self.shared.write_line(record.time.timestamp(), line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        self.shared.lock_current().file.flush()
    }

    fn describe(&self) -> String {
        self.shared.link.display().to_string()
    }
}

fn rotated_path(link: &Path, suffix: &str, window_start: i64) -> PathBuf {
    let start = DateTime::<Utc>::from_timestamp(window_start, 0).unwrap_or_default();
    let mut name = link.as_os_str().to_os_string();
    name.push(start.format(suffix).to_string());
    PathBuf::from(name)
}

/// Point `link` at `target` without a moment where `link` is missing.
fn swap_link(target: &Path, link: &Path) -> Result<(), LogError> {
    let link_err = |source| LogError::Link {
        path: link.to_path_buf(),
        source,
    };

    // relative target keeps the link valid if the directory moves
    let relative = target.file_name().map(Path::new).unwrap_or(target);
    let tmp = link.with_file_name(format!(
        ".{}.tmp",
        link.file_name().and_then(|n| n.to_str()).unwrap_or("current")
    ));

    let _ = fs::remove_file(&tmp);
    make_symlink(relative, &tmp).map_err(link_err)?;
    fs::rename(&tmp, link).map_err(link_err)
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

fn into_io(err: LogError) -> io::Error {
    io::Error::other(err)
}

fn spawn_janitor(shared: Weak<Shared>) {
    let interval = match shared.upgrade() {
        Some(s) => s.policy.max_age.min(MAX_PURGE_INTERVAL),
        None => return,
    };

    let spawned = thread::Builder::new()
        .name("log-janitor".to_string())
        .spawn(move || loop {
            thread::sleep(interval);
            match shared.upgrade() {
                Some(shared) => {
                    shared.purge_expired();
                }
                None => break,
            }
        });
    if let Err(e) = spawned {
        eprintln!("log janitor: thread failed to start: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::caller::CallSite;

    fn write(sink: &RotatingFileSink, message: &str) {
        let record = Record::new(Severity::Info, "rotate-test", message, CallSite { file: "t.rs", line: 1 });
        sink.write_record(&record).unwrap();
    }

    #[test]
    fn test_window_alignment() {
        let policy = RotationPolicy::every(Duration::from_secs(10));
        assert_eq!(policy.window_start(1_000_007), 1_000_000);
        assert_eq!(policy.window_start(1_000_000), 1_000_000);
        assert_eq!(RotationPolicy::default().window_start(86_400 * 3 + 5), 86_400 * 3);
    }

    #[test]
    fn test_rotated_path_uses_suffix() {
        let link = Path::new("/logs/monitor-api-all.log");
        let path = rotated_path(link, ".%Y%m%d%H%M", 0);
        assert_eq!(path, PathBuf::from("/logs/monitor-api-all.log.197001010000"));
    }

    #[test]
    fn test_link_created_after_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RotatingFileSink::open(dir.path(), "all.log", RotationPolicy::default(), Encoding::Json).unwrap();
        assert!(fs::symlink_metadata(sink.link_path()).is_err());

        write(&sink, "first");
        let via_link = fs::read_to_string(sink.link_path()).unwrap();
        assert!(via_link.contains("\"msg\":\"first\""));
        assert_eq!(fs::canonicalize(sink.link_path()).unwrap(), fs::canonicalize(sink.current_path()).unwrap());
    }

    #[test]
    fn test_rotation_moves_link_to_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RotatingFileSink::open(dir.path(), "all.log", RotationPolicy::every(Duration::from_secs(60)), Encoding::Json).unwrap();
        write(&sink, "before");
        let first = sink.current_path();

        let later = Utc::now().timestamp() + 120;
        sink.shared.write_line(later, b"{\"msg\":\"after\"}\n").unwrap();
        let second = sink.current_path();

        assert_ne!(first, second);
        assert!(fs::read_to_string(&first).unwrap().contains("before"));
        assert_eq!(fs::read_to_string(sink.link_path()).unwrap(), "{\"msg\":\"after\"}\n");
    }

    #[test]
    fn test_purge_removes_only_expired_rotated_files() {
        let dir = tempfile::tempdir().unwrap();
        let policy = RotationPolicy {
            max_age: Duration::from_secs(3600),
            ..RotationPolicy::default()
        };
        let sink = RotatingFileSink::open(dir.path(), "all.log", policy, Encoding::Json).unwrap();
        write(&sink, "live");

        let old = dir.path().join("all.log.200001010000");
        let fresh = dir.path().join("all.log.209901010000");
        let unrelated = dir.path().join("info.log");
        for path in [&old, &fresh, &unrelated] {
            fs::write(path, "x\n").unwrap();
        }
        let two_hours_ago = SystemTime::now() - Duration::from_secs(7200);
        File::options().write(true).open(&old).unwrap().set_modified(two_hours_ago).unwrap();
        File::options().write(true).open(&unrelated).unwrap().set_modified(two_hours_ago).unwrap();

        assert_eq!(sink.purge_expired(), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
        assert!(sink.current_path().exists());
        assert!(sink.link_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_purge_keeps_link_target_from_earlier_run() {
        let dir = tempfile::tempdir().unwrap();
        let previous = dir.path().join("all.log.200001010000");
        fs::write(&previous, "{\"msg\":\"last run\"}\n").unwrap();
        std::os::unix::fs::symlink("all.log.200001010000", dir.path().join("all.log")).unwrap();
        let two_hours_ago = SystemTime::now() - Duration::from_secs(7200);
        File::options().write(true).open(&previous).unwrap().set_modified(two_hours_ago).unwrap();

        let policy = RotationPolicy {
            max_age: Duration::from_secs(3600),
            ..RotationPolicy::default()
        };
        let sink = RotatingFileSink::open(dir.path(), "all.log", policy, Encoding::Json).unwrap();
        assert_ne!(sink.current_path(), previous);

        assert_eq!(sink.purge_expired(), 0);
        assert!(fs::read_to_string(sink.link_path()).unwrap().contains("last run"));

        // once the link moves on, the old file is fair game
        write(&sink, "fresh");
        assert_eq!(sink.purge_expired(), 1);
        assert!(!previous.exists());
    }
}
