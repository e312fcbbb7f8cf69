//! Personal delivery history log
//!
//! One pipe-delimited line per delivered shot, appended to a log file in
//! the user's home:
//!
//! ```text
//! 2026-03-01 14:30|Review|SH010|COMP|Local|alice|PRJ_20260301_143000
//! ```
//!
//! The log is append-only and never rewritten. Appends take a cross-process
//! advisory lock through an adjacent `.lock` file created with
//! `create_new`, so two instances writing to a shared home directory do not
//! interleave their lines. Stale locks are taken over after a timeout.

use super::error::{ReviewError, Result};
use super::types::HistoryEntry;
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY: Duration = Duration::from_millis(50);

/// Replace the field delimiter so free-form text cannot corrupt the log
pub fn sanitize_field(value: &str) -> String {
    value.replace('|', "-")
}

/// Append-only per-user record of delivery events
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append entries under the advisory lock.
    pub fn append(&self, entries: &[HistoryEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let _lock = LogLock::acquire(&self.path, LOCK_TIMEOUT)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for entry in entries {
            file.write_all(format_line(entry).as_bytes())?;
        }
        debug!(log = %self.path.display(), count = entries.len(), "Appended history entries");
        Ok(())
    }

    /// Read every well-formed entry, oldest first. Malformed lines are
    /// skipped, not fatal.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(contents.lines().filter_map(parse_line).collect())
    }

    /// Entries for one shot id
    pub fn entries_for_shot(&self, shot_id: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| entry.shot_id == shot_id)
            .collect())
    }
}

fn format_line(entry: &HistoryEntry) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}\n",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        sanitize_field(&entry.category),
        sanitize_field(&entry.shot_id),
        sanitize_field(&entry.step),
        sanitize_field(&entry.destination),
        sanitize_field(&entry.user),
        sanitize_field(&entry.package_name),
    )
}

fn parse_line(line: &str) -> Option<HistoryEntry> {
    let parts: Vec<&str> = line.trim().split('|').collect();
    if parts.len() < 7 {
        return None;
    }
    let timestamp = NaiveDateTime::parse_from_str(parts[0], TIMESTAMP_FORMAT).ok()?;
    Some(HistoryEntry {
        timestamp,
        category: parts[1].to_string(),
        shot_id: parts[2].to_string(),
        step: parts[3].to_string(),
        destination: parts[4].to_string(),
        user: parts[5].to_string(),
        package_name: parts[6].to_string(),
    })
}

/// Advisory cross-process lock via an exclusively-created sibling file.
/// Dropping the guard releases the lock.
struct LogLock {
    lock_path: PathBuf,
}

impl LogLock {
    fn acquire(log_path: &Path, timeout: Duration) -> Result<Self> {
        let lock_path = log_path.with_extension("lock");
        let deadline = Instant::now() + timeout;
        loop {
            match Self::try_create(&lock_path) {
                Ok(()) => return Ok(Self { lock_path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        // Holder likely died: remove the stale lock and
                        // make one final attempt
                        warn!(lock = %lock_path.display(), "Taking over stale history lock");
                        let _ = fs::remove_file(&lock_path);
                        return match Self::try_create(&lock_path) {
                            Ok(()) => Ok(Self { lock_path }),
                            Err(_) => Err(ReviewError::HistoryLock(lock_path)),
                        };
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn try_create(lock_path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)?;
        write!(file, "{}", std::process::id())?;
        Ok(())
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
