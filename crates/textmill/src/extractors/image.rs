//! Image OCR extraction.
//!
//! Images carry no text layer, so the only extraction path is a tesseract
//! run over the file as-is. Whitespace-only recognition output is surfaced
//! as a no-usable-text failure so the engine never caches it.

use crate::capabilities::Capabilities;
use crate::config::EngineConfig;
use crate::{ocr, Result, TextmillError};
use std::path::Path;
use std::time::Duration;

fn install_message() -> String {
    "Tesseract OCR is required for image recognition. \
     Install: Linux: 'apt install tesseract-ocr tesseract-ocr-rus', \
     macOS: 'brew install tesseract tesseract-lang', \
     Windows: 'winget install UB-Mannheim.TesseractOCR'."
        .to_string()
}

pub fn extract(path: &Path, caps: &Capabilities, config: &EngineConfig) -> Result<String> {
    let Some(tesseract) = caps.tesseract.as_deref() else {
        return Err(TextmillError::MissingDependency(install_message()));
    };

    let text = ocr::recognize_image(
        tesseract,
        path,
        &config.ocr_languages,
        Some(Duration::from_secs(config.ocr_timeout_secs)),
    )?;

    if text.trim().is_empty() {
        return Err(TextmillError::NoUsableText(format!(
            "no text recognized in {}",
            path.display()
        )));
    }
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tesseract_is_capability_error() {
        let err = extract(
            Path::new("scan.png"),
            &Capabilities::none(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "missing-dependency");
        assert!(err.to_string().contains("Tesseract"));
    }
}
