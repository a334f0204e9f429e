//! DOCX (Microsoft Word) text extraction using docx-lite.
//!
//! Paragraphs are kept in document order; blank paragraphs are dropped
//! entirely rather than becoming empty lines. A document with no non-blank
//! paragraphs yields an empty string, which the engine reports as a no-text
//! failure.

use crate::{Result, TextmillError};
use std::path::Path;

pub fn extract(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    extract_from_bytes(&bytes)
}

pub fn extract_from_bytes(bytes: &[u8]) -> Result<String> {
    let raw = docx_lite::extract_text_from_bytes(bytes)
        .map_err(|e| TextmillError::parsing(format!("DOCX text extraction failed: {e}")))?;

    let paragraphs: Vec<&str> = raw
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();
    Ok(paragraphs.join("\n"))
}
