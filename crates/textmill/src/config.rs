//! Engine configuration.
//!
//! All knobs are defaulted so `EngineConfig::default()` is a working setup;
//! a TOML file can override any subset of fields.

use crate::{Result, TextmillError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the cache store file.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory for session error logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Tesseract language specification for combined recognition.
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,

    /// Rasterization DPI for the PDF OCR recovery stage.
    #[serde(default = "default_pdf_dpi")]
    pub pdf_dpi: u32,

    /// Page count past which a leading warning block is prepended.
    #[serde(default = "default_page_warning_threshold")]
    pub page_warning_threshold: usize,

    /// Bounded wait for a single OCR subprocess invocation, in seconds.
    #[serde(default = "default_ocr_timeout_secs")]
    pub ocr_timeout_secs: u64,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".textmill/cache")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".textmill/logs")
}

fn default_ocr_languages() -> String {
    "rus+eng".to_string()
}

fn default_pdf_dpi() -> u32 {
    300
}

fn default_page_warning_threshold() -> usize {
    200
}

fn default_ocr_timeout_secs() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            log_dir: default_log_dir(),
            ocr_languages: default_ocr_languages(),
            pdf_dpi: default_pdf_dpi(),
            page_warning_threshold: default_page_warning_threshold(),
            ocr_timeout_secs: default_ocr_timeout_secs(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| TextmillError::serialization(format!("invalid config file: {e}")))
    }
}
