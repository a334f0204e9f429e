//! Tesseract and poppler subprocess plumbing.
//!
//! OCR runs as an external `tesseract` invocation writing to a captured
//! stdout file; PDF rasterization shells out to poppler's `pdftoppm`. Both
//! tools are resolved up front by [`crate::capabilities::Capabilities`] -
//! this module only ever receives already-resolved executable paths.
//!
//! OCR invocations support a bounded wait: past the deadline the child is
//! killed and the call fails with an OCR error, which callers treat as a
//! per-page failure rather than a fatal one.

use crate::{Result, TextmillError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Run tesseract over one image file, requesting combined recognition in
/// `languages` (e.g. `"rus+eng"`). No preprocessing is applied.
pub fn recognize_image(
    tesseract: &Path,
    image: &Path,
    languages: &str,
    timeout: Option<Duration>,
) -> Result<String> {
    let stdout_file = tempfile::NamedTempFile::new()?;

    let mut child = Command::new(tesseract)
        .arg(image)
        .arg("stdout")
        .arg("-l")
        .arg(languages)
        .stdout(stdout_file.reopen()?)
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| TextmillError::ocr(format!("failed to start tesseract: {e}")))?;

    let status = match timeout {
        Some(limit) => {
            let deadline = Instant::now() + limit;
            loop {
                match child.try_wait()? {
                    Some(status) => break status,
                    None if Instant::now() >= deadline => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(TextmillError::ocr(format!(
                            "tesseract exceeded {}s limit on {}",
                            limit.as_secs(),
                            image.display()
                        )));
                    }
                    None => std::thread::sleep(Duration::from_millis(50)),
                }
            }
        }
        None => child.wait()?,
    };

    if !status.success() {
        return Err(TextmillError::ocr(format!(
            "tesseract failed on {} (status {status})",
            image.display()
        )));
    }

    let bytes = std::fs::read(stdout_file.path())?;
    Ok(decode_tool_output(&bytes))
}

/// Rasterize every page of a PDF to PNG files under `out_dir`, returning the
/// page images in page order.
pub fn rasterize_pdf(pdftoppm: &Path, pdf: &Path, out_dir: &Path, dpi: u32) -> Result<Vec<PathBuf>> {
    let prefix = out_dir.join("page");
    let output = Command::new(pdftoppm)
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-png")
        .arg(pdf)
        .arg(&prefix)
        .output()
        .map_err(|e| TextmillError::ocr(format!("failed to start pdftoppm: {e}")))?;

    if !output.status.success() {
        return Err(TextmillError::ocr(format!(
            "pdftoppm failed on {}: {}",
            pdf.display(),
            decode_tool_output(&output.stderr).trim()
        )));
    }

    let mut pages: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
        .collect();
    // pdftoppm zero-pads page numbers, so lexical order is page order.
    pages.sort();
    Ok(pages)
}

/// Subprocess output decoding: strict UTF-8, then windows-1251, then lossy.
fn decode_tool_output(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let (text, _, had_errors) = encoding_rs::WINDOWS_1251.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_output() {
        assert_eq!(decode_tool_output("привет".as_bytes()), "привет");
    }

    #[test]
    fn test_decode_cp1251_output() {
        // "привет" in windows-1251.
        let bytes = [0xEF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(decode_tool_output(&bytes), "привет");
    }

    #[test]
    fn test_recognize_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("page.png");
        std::fs::write(&image, b"not an image").unwrap();

        let err = recognize_image(
            Path::new("/nonexistent/tesseract"),
            &image,
            "eng",
            Some(Duration::from_secs(1)),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "ocr");
    }

    #[test]
    fn test_rasterize_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = rasterize_pdf(
            Path::new("/nonexistent/pdftoppm"),
            Path::new("input.pdf"),
            dir.path(),
            300,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "ocr");
    }
}
