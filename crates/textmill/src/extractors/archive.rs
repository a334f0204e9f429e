//! Archive extraction.
//!
//! ZIP archives are unpacked entry by entry; each supported entry produces
//! exactly one labeled block in the output, whether it extracted cleanly or
//! failed. Failure text is useful diagnostic payload, so an archive counts as
//! successfully processed as long as at least one entry produced a block,
//! even when every block is an error report.
//!
//! `.rar` and `.7z` are recognized but unhandled; they fail with an
//! unsupported-format error the batch layer accounts separately.
//!
//! Entry payloads needing a real file on disk (PDF, DOCX, legacy documents)
//! are materialized into a named temporary file that is removed on every
//! exit path, before the next entry starts.

use crate::cancel::CancelToken;
use crate::capabilities::Capabilities;
use crate::config::EngineConfig;
use crate::{Result, TextmillError};
use std::io::{Read, Write};
use std::path::Path;

/// Entry extensions processed inside a ZIP. Everything else is ignored.
const ENTRY_ALLOWLIST: &[&str] = &["txt", "md", "pdf", "docx", "doc", "rtf"];

pub fn extract(
    path: &Path,
    caps: &Capabilities,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "zip" => extract_zip(path, caps, config, cancel),
        "rar" => Err(TextmillError::UnsupportedFormat(
            "RAR archives are not supported. Extract the archive manually or repack it as ZIP."
                .to_string(),
        )),
        "7z" => Err(TextmillError::UnsupportedFormat(
            "7z archives are not supported. Extract the archive manually or repack it as ZIP."
                .to_string(),
        )),
        other => Err(TextmillError::UnsupportedFormat(format!(
            "not an archive extension: .{other}"
        ))),
    }
}

fn extract_zip(
    path: &Path,
    caps: &Capabilities,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<String> {
    if std::fs::metadata(path)?.len() == 0 {
        return Err(TextmillError::EmptyInput(format!(
            "{} is a zero-byte archive",
            path.display()
        )));
    }

    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    if archive.is_empty() {
        return Err(TextmillError::EmptyInput(format!(
            "{} contains no entries",
            path.display()
        )));
    }

    // Full integrity pass before any extraction. Reading an entry to the end
    // verifies its CRC; a single bad entry fails the whole archive.
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let mut sink = std::io::sink();
        std::io::copy(&mut entry, &mut sink).map_err(|e| {
            TextmillError::Corrupted(format!("{} failed integrity check: {e}", path.display()))
        })?;
    }

    let mut blocks: Vec<String> = Vec::new();
    let mut found_supported = false;

    for index in 0..archive.len() {
        if cancel.is_cancelled() {
            break;
        }

        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let Some(ext) = entry_extension(&name) else {
            continue;
        };
        if !ENTRY_ALLOWLIST.contains(&ext.as_str()) {
            continue;
        }
        found_supported = true;

        let mut content = Vec::new();
        if let Err(e) = entry.read_to_end(&mut content) {
            blocks.push(error_block(&name, &format!("could not read entry: {e}")));
            continue;
        }
        if content.is_empty() {
            tracing::debug!(entry = %name, "zero-byte entry, skipping");
            continue;
        }

        match ext.as_str() {
            "txt" | "md" => match super::text::decode(&content) {
                Some(text) if !text.trim().is_empty() => {
                    blocks.push(entry_block(&name, &text));
                }
                Some(_) => {
                    blocks.push(error_block(&name, "entry contains no extractable text"));
                }
                None => {
                    blocks.push(error_block(
                        &name,
                        "could not decode as utf-8, windows-1251 or windows-1252",
                    ));
                }
            },
            _ => {
                let result = extract_document_entry(&ext, &content, caps, config, cancel);
                match result {
                    Ok(text) if !text.trim().is_empty() => {
                        blocks.push(entry_block(&name, &text));
                    }
                    Ok(_) => {
                        blocks.push(error_block(&name, "document contains no extractable text"));
                    }
                    Err(e) => {
                        blocks.push(error_block(&name, &e.to_string()));
                    }
                }
            }
        }
    }

    if !found_supported {
        return Err(TextmillError::NoUsableText(format!(
            "{} contains no supported file types (expected one of: {})",
            path.display(),
            ENTRY_ALLOWLIST.join(", ")
        )));
    }

    let result = blocks.join("\n\n");
    if result.trim().is_empty() {
        return Err(TextmillError::NoUsableText(format!(
            "no text could be extracted from {}; its supported entries were empty",
            path.display()
        )));
    }
    Ok(result)
}

/// Materialize entry bytes to a suffixed temp file and run the matching
/// extractor. The file is deleted when the guard drops, on every path.
fn extract_document_entry(
    ext: &str,
    content: &[u8],
    caps: &Capabilities,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<String> {
    let mut temp = tempfile::Builder::new()
        .suffix(&format!(".{ext}"))
        .tempfile()?;
    temp.write_all(content)?;
    temp.flush()?;

    match ext {
        "pdf" => super::pdf::extract_archive_entry(temp.path(), caps, config, cancel),
        "docx" => super::docx::extract(temp.path()),
        "doc" | "rtf" => super::legacy::extract(temp.path(), caps),
        other => Err(TextmillError::UnsupportedFormat(format!(
            "no entry handler for .{other}"
        ))),
    }
}

fn entry_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

fn entry_block(name: &str, text: &str) -> String {
    format!("=== ARCHIVE ENTRY: {name} ===\n{}", text.trim_end())
}

fn error_block(name: &str, message: &str) -> String {
    format!("=== ARCHIVE ENTRY ERROR: {name} ===\n{message}")
}
