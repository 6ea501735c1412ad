//! Append-only audit log of clicks, captures and lifecycle events.
//!
//! Every call appends one complete `<timestamp> - <message>` line while
//! holding a mutex, so concurrent writers never interleave. Write failures
//! are reported through the process logger and never reach the caller.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp layout of every log line, e.g. `2024-03-09 07:05:02.042`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub struct EventLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a timestamped line. Never fails from the caller's view.
    pub fn log(&self, message: &str) {
        // Keep logging after a writer panicked.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let line = format!("{} - {}\n", Local::now().format(TIMESTAMP_FORMAT), message);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            log::error!(
                "Can't write to event log {}: {} (message: {})",
                self.path.display(),
                e,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn line_has_timestamp_separator_and_message() {
        let path = std::env::temp_dir().join(format!("click-spy-log-format-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let log = EventLog::new(&path);
        log.log("App started.");

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().unwrap();
        let (stamp, message) = line.split_once(" - ").unwrap();
        assert!(NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok(), "bad stamp: {}", stamp);
        assert_eq!(stamp.len(), 23);
        assert_eq!(message, "App started.");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let path = std::env::temp_dir()
            .join(format!("click-spy-no-such-dir-{}", std::process::id()))
            .join("log.txt");
        let log = EventLog::new(&path);
        log.log("goes nowhere");
        assert!(!path.exists());
    }
}
