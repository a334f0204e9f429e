//! Session error log.
//!
//! Append-only record of per-file failures: `(timestamp, error_kind,
//! filepath, message)` tuples written to a session-scoped file for the
//! diagnostic viewer. The engine only ever appends; it never reads the log
//! back. Session-level progress messages go through `tracing` instead.

use crate::Result;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Append-only sink for per-file extraction failures.
pub struct ErrorLog {
    path: PathBuf,
    /// In-memory per-kind counters for the end-of-session summary.
    counts: BTreeMap<String, usize>,
}

impl ErrorLog {
    /// Create a session log file under `log_dir`, named by start time.
    pub fn create(log_dir: impl AsRef<Path>) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)?;
        let stamp = unix_now();
        let path = log_dir.join(format!("errors_{stamp}.log"));
        let mut file = File::create(&path)?;
        writeln!(file, "# textmill session error log, started {stamp}")?;
        Ok(Self {
            path,
            counts: BTreeMap::new(),
        })
    }

    /// Record one failure. Log write errors are swallowed after a trace
    /// message; a broken log must not fail the batch.
    pub fn record(&mut self, kind: &str, filepath: &Path, message: &str) {
        *self.counts.entry(kind.to_string()).or_insert(0) += 1;
        let line = format!("[{}] {}: {} | {}", unix_now(), kind, filepath.display(), message);
        tracing::warn!(kind, path = %filepath.display(), message, "extraction failure");
        if let Err(e) = self.append_line(&line) {
            tracing::debug!("failed to append to error log: {e}");
        }
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{line}")
    }

    /// Number of failures recorded per error kind this session.
    pub fn summary(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
