//! The extraction orchestrator.
//!
//! [`DocumentEngine`] owns the session state: configuration, the probed
//! capability record, the result cache, the error log and the cancellation
//! token. Per-file processing is strictly sequential:
//!
//! 1. Fresh cache hit short-circuits extraction entirely.
//! 2. Otherwise dispatch on the lowercased extension over the closed format
//!    map and run exactly one extractor.
//! 3. A clean run that produced only whitespace is a no-text failure, never
//!    cached.
//! 4. Non-empty success is written back to the cache.
//!
//! Errors never escape a file: [`DocumentEngine::extract_text`] reports them
//! as `success = false` with the message as payload, after recording them in
//! the error log.

use crate::cache::ResultCache;
use crate::cancel::CancelToken;
use crate::capabilities::Capabilities;
use crate::config::EngineConfig;
use crate::core::formats::{self, FormatFamily};
use crate::extractors;
use crate::logging::ErrorLog;
use crate::{Result, TextmillError};
use std::path::Path;

/// Per-file result as reported to interactive callers: recovered text (or a
/// failure message) and whether extraction succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub success: bool,
}

pub struct DocumentEngine {
    config: EngineConfig,
    caps: Capabilities,
    cache: ResultCache,
    error_log: ErrorLog,
    cancel: CancelToken,
}

impl DocumentEngine {
    pub fn new(config: EngineConfig, caps: Capabilities) -> Result<Self> {
        let cache = ResultCache::open(&config.cache_dir)?;
        let error_log = ErrorLog::create(&config.log_dir)?;
        Ok(Self {
            config,
            caps,
            cache,
            error_log,
            cancel: CancelToken::new(),
        })
    }

    /// The session's cancellation token. Clones share state, so a controller
    /// thread can hold one and cancel a running batch.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract text from one file, reporting failure in-band.
    pub fn extract_text(&mut self, path: &Path) -> Extraction {
        match self.extract(path) {
            Ok(text) => Extraction {
                text,
                success: true,
            },
            Err(e) => Extraction {
                text: e.to_string(),
                success: false,
            },
        }
    }

    /// Extract text from one file. Failures are recorded in the error log
    /// before being returned.
    pub fn extract(&mut self, path: &Path) -> Result<String> {
        if let Some(text) = self.cache.get(path) {
            tracing::debug!(path = %path.display(), "cache hit");
            return Ok(text.to_string());
        }

        match self.run_extractor(path) {
            Ok(text) => {
                self.cache.put(path, text.clone());
                Ok(text)
            }
            Err(e) => {
                self.error_log.record(e.kind(), path, &e.to_string());
                Err(e)
            }
        }
    }

    fn run_extractor(&self, path: &Path) -> Result<String> {
        if std::fs::metadata(path)?.len() == 0 {
            return Err(TextmillError::EmptyInput(format!(
                "{} is a zero-byte file",
                path.display()
            )));
        }

        let family = formats::family_for(path).ok_or_else(|| {
            TextmillError::UnsupportedFormat(format!(
                "no handler for {} (supported: {})",
                path.display(),
                formats::supported_extensions().join(", ")
            ))
        })?;

        let text = match family {
            FormatFamily::Text => extractors::text::extract(path)?,
            FormatFamily::Pdf => {
                extractors::pdf::extract(path, &self.caps, &self.config, &self.cancel)?
            }
            FormatFamily::Image => extractors::image::extract(path, &self.caps, &self.config)?,
            FormatFamily::Document => match formats::extension_of(path).as_deref() {
                Some("docx") => extractors::docx::extract(path)?,
                _ => extractors::legacy::extract(path, &self.caps)?,
            },
            FormatFamily::Archive => {
                extractors::archive::extract(path, &self.caps, &self.config, &self.cancel)?
            }
        };

        if text.trim().is_empty() {
            return Err(TextmillError::NoUsableText(format!(
                "{} produced no text",
                path.display()
            )));
        }
        Ok(text)
    }

    /// Flush the result cache to its backing store.
    pub fn save_cache(&self) -> Result<()> {
        self.cache.save()
    }

    /// Drop all cached results and delete the store file.
    pub fn clear_cache(&mut self) -> Result<()> {
        self.cache.clear()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Per-kind failure counts recorded this session.
    pub fn error_summary(&self) -> &std::collections::BTreeMap<String, usize> {
        self.error_log.summary()
    }

    pub fn error_log_path(&self) -> &Path {
        self.error_log.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn engine(dir: &Path) -> DocumentEngine {
        let config = EngineConfig {
            cache_dir: dir.join("cache"),
            log_dir: dir.join("logs"),
            ..EngineConfig::default()
        };
        DocumentEngine::new(config, Capabilities::none()).unwrap()
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_text_file_extraction_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "note.txt", "hello world");

        let result = engine.extract_text(&file);
        assert!(result.success);
        assert_eq!(result.text, "hello world");
    }

    #[test]
    fn test_second_extraction_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "note.txt", "original");

        assert!(engine.extract_text(&file).success);

        // Rewrite the content but restore size and mtime, so the cache still
        // considers its record fresh. Getting the old text back proves the
        // decode path did not re-run.
        let mtime = std::fs::metadata(&file).unwrap().modified().unwrap();
        std::fs::write(&file, "CHANGED!").unwrap();
        filetime::set_file_mtime(&file, filetime::FileTime::from_system_time(mtime)).unwrap();

        let result = engine.extract_text(&file);
        assert!(result.success);
        assert_eq!(result.text, "original");
    }

    #[test]
    fn test_modified_file_is_re_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "note.txt", "before");

        assert_eq!(engine.extract_text(&file).text, "before");
        std::fs::write(&file, "after, and longer").unwrap();
        assert_eq!(engine.extract_text(&file).text, "after, and longer");
    }

    #[test]
    fn test_blank_text_is_failure_and_never_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "blank.txt", "   \n\t\n");

        let result = engine.extract_text(&file);
        assert!(!result.success);
        assert_eq!(engine.cache_len(), 0);
        assert_eq!(engine.error_summary().get("no-usable-text"), Some(&1));
    }

    #[test]
    fn test_zero_byte_file_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "void.txt", "");

        let err = engine.extract(&file).unwrap_err();
        assert_eq!(err.kind(), "empty-input");
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "sheet.xlsx", "not really a spreadsheet");

        let err = engine.extract(&file).unwrap_err();
        assert_eq!(err.kind(), "unsupported-format");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let err = engine.extract(&dir.path().join("gone.txt")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_failures_reported_in_band() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "old.doc", "legacy document bytes");

        let result = engine.extract_text(&file);
        assert!(!result.success);
        assert!(result.text.contains("LibreOffice"));
    }

    #[test]
    fn test_failures_land_in_error_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "old.doc", "legacy document bytes");

        let _ = engine.extract_text(&file);
        let log = std::fs::read_to_string(engine.error_log_path()).unwrap();
        assert!(log.contains("old.doc"));
        assert!(log.contains("missing-dependency"));
    }

    #[test]
    fn test_cache_persists_across_engines() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(dir.path(), "note.txt", "persistent");

        {
            let mut engine = engine(dir.path());
            assert!(engine.extract_text(&file).success);
            engine.save_cache().unwrap();
        }

        let mut engine = engine(dir.path());
        assert_eq!(engine.cache_len(), 1);
        assert_eq!(engine.extract_text(&file).text, "persistent");
    }

    #[test]
    fn test_clear_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine(dir.path());
        let file = write_file(dir.path(), "note.txt", "hello");

        assert!(engine.extract_text(&file).success);
        assert_eq!(engine.cache_len(), 1);
        engine.clear_cache().unwrap();
        assert_eq!(engine.cache_len(), 0);
    }
}
