// # File Audit Log
//
// Newline-delimited log with a rolling retention window.
//
// ## Format
//
// Each line starts with a fixed-width local timestamp followed by the
// message:
//
// ```text
// 2025-07-17 06:15:02 home.example.com updated from 1.2.3.3 to 1.2.3.4
// ```
//
// ## Retention
//
// Every append re-reads the log, drops lines whose leading timestamp
// parses as older than the retention window, appends the new entry, and
// rewrites the file in full. Lines whose timestamp cannot be parsed are
// always retained; a diagnostic is never silently discarded. Appends are
// O(log size), which is acceptable at one entry per invocation and a
// minutes-to-hours invocation cadence.

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::traits::audit::{AuditError, AuditLog};

/// Timestamp format prefixing every entry
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of the formatted timestamp prefix
const TIMESTAMP_WIDTH: usize = 19;

/// Default retention window in days
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// File-backed audit log with rolling retention
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
    retention: Duration,
}

impl FileAuditLog {
    /// Create a log with the default 7-day retention window
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_retention(path, Duration::days(DEFAULT_RETENTION_DAYS))
    }

    /// Create a log with an explicit retention window
    pub fn with_retention<P: AsRef<Path>>(path: P, retention: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            retention,
        }
    }

    fn keep_line(line: &str, cutoff: NaiveDateTime) -> bool {
        let Some(prefix) = line.get(..TIMESTAMP_WIDTH) else {
            // Too short to carry a timestamp; retain unconditionally.
            return true;
        };
        match NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT) {
            Ok(stamp) => stamp >= cutoff,
            // Unparseable prefix: fail open, keep the line.
            Err(_) => true,
        }
    }
}

#[async_trait]
impl AuditLog for FileAuditLog {
    async fn append(&self, message: &str) -> Result<(), AuditError> {
        let now = Local::now();
        let cutoff = now.naive_local() - self.retention;

        let mut kept: Vec<String> = Vec::new();
        match fs::read_to_string(&self.path).await {
            Ok(existing) => {
                for line in existing.lines() {
                    if Self::keep_line(line, cutoff) {
                        kept.push(line.to_string());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let entry = format!("{} {}", now.format(TIMESTAMP_FORMAT), message);
        tracing::info!("{message}");
        kept.push(entry);

        let mut content = kept.join("\n");
        content.push('\n');
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn append_creates_and_stamps_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("update.log");
        let log = FileAuditLog::new(&path);

        log.append("first entry").await.unwrap();
        log.append("second entry").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first entry"));
        assert!(lines[1].ends_with("second entry"));

        // Every line leads with a parseable fixed-width timestamp.
        for line in lines {
            NaiveDateTime::parse_from_str(&line[..19], TIMESTAMP_FORMAT).unwrap();
        }
    }

    #[tokio::test]
    async fn entries_beyond_retention_are_pruned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("update.log");

        let stale = (Local::now() - Duration::days(8))
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let fresh = (Local::now() - Duration::days(1))
            .format(TIMESTAMP_FORMAT)
            .to_string();
        std::fs::write(
            &path,
            format!("{stale} stale entry\n{fresh} fresh entry\n"),
        )
        .unwrap();

        let log = FileAuditLog::new(&path);
        log.append("new entry").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale entry"));
        assert!(content.contains("fresh entry"));
        assert!(content.contains("new entry"));
    }

    #[tokio::test]
    async fn unparseable_lines_are_always_retained() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("update.log");

        std::fs::write(
            &path,
            "!! panic backtrace without a timestamp\nshort\n",
        )
        .unwrap();

        let log = FileAuditLog::new(&path);
        log.append("new entry").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("panic backtrace"));
        assert!(content.contains("short"));
        assert!(content.contains("new entry"));
    }

    #[tokio::test]
    async fn retention_window_is_configurable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("update.log");

        let recent = (Local::now() - Duration::hours(2))
            .format(TIMESTAMP_FORMAT)
            .to_string();
        std::fs::write(&path, format!("{recent} two hours old\n")).unwrap();

        let log = FileAuditLog::with_retention(&path, Duration::hours(1));
        log.append("new entry").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("two hours old"));
        assert!(content.contains("new entry"));
    }
}
