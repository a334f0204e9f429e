//! Batch processing over an ordered file list.
//!
//! Files are processed strictly in input order, one at a time. A per-file
//! failure never aborts the batch; the file lands in the failed set and the
//! loop moves on. Cancellation is checked at file boundaries, preserving
//! everything already processed.
//!
//! Each outcome goes to exactly one of three sets:
//!
//! - succeeded: text extracted, contributes a divider-headed block
//! - unsupported: recognized but unhandled (`.rar`/`.7z`); contributes a
//!   diagnostic block but counts in neither success nor failure totals
//! - failed: everything else; the error is already in the session log

use crate::core::engine::DocumentEngine;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DIVIDER: &str =
    "============================================================";

/// Per-extension aggregate over the succeeded set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatStat {
    pub count: usize,
    pub total_chars: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Relative paths, in processing order.
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub unsupported: Vec<PathBuf>,
    /// One divider-headed block per succeeded file (plus diagnostic blocks
    /// for unsupported ones), in processing order.
    pub blocks: Vec<String>,
    pub stats: BTreeMap<String, FormatStat>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.unsupported.len()
    }
}

/// Process `files` in order. Paths are reported relative to `base_dir` where
/// possible, as-given otherwise.
pub fn process_batch(
    engine: &mut DocumentEngine,
    files: &[PathBuf],
    base_dir: &Path,
) -> BatchReport {
    let cancel = engine.cancel_token();
    let mut report = BatchReport::default();

    for file in files {
        if cancel.is_cancelled() {
            tracing::info!(
                processed = report.processed(),
                remaining = files.len() - report.processed(),
                "batch cancelled"
            );
            break;
        }

        let relative = file
            .strip_prefix(base_dir)
            .unwrap_or(file.as_path())
            .to_path_buf();

        match engine.extract(file) {
            Ok(text) => {
                report.blocks.push(file_block(&relative, &text));
                let ext = crate::core::formats::extension_of(file).unwrap_or_default();
                let stat = report.stats.entry(ext).or_default();
                stat.count += 1;
                stat.total_chars += text.chars().count();
                report.succeeded.push(relative);
            }
            Err(e) if e.kind() == "unsupported-format" => {
                report.blocks.push(file_block(&relative, &e.to_string()));
                report.unsupported.push(relative);
            }
            Err(_) => {
                report.failed.push(relative);
            }
        }
    }

    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        unsupported = report.unsupported.len(),
        "batch finished"
    );
    report
}

fn file_block(relative: &Path, text: &str) -> String {
    format!(
        "{DIVIDER}\nFILE: {}\n{DIVIDER}\n{}\n",
        relative.display(),
        text.trim()
    )
}
