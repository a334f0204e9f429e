//! Read-only file diagnostics.
//!
//! [`diagnose`] explains why a file likely failed extraction, without running
//! the extraction pipeline and without touching the cache or the error log.
//! The result is a snapshot recomputed on every call, never persisted.

use crate::capabilities::Capabilities;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Findings for one file: observed problems and remediation suggestions, in
/// the order the checks ran.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub path: PathBuf,
    pub exists: bool,
    pub size: u64,
    pub extension: String,
    pub problems: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnosis {
    fn problem(&mut self, text: impl Into<String>) {
        self.problems.push(text.into());
    }

    fn suggest(&mut self, text: impl Into<String>) {
        self.suggestions.push(text.into());
    }
}

pub fn diagnose(path: &Path, caps: &Capabilities) -> Diagnosis {
    let mut diagnosis = Diagnosis {
        path: path.to_path_buf(),
        exists: false,
        size: 0,
        extension: crate::core::formats::extension_of(path).unwrap_or_default(),
        problems: Vec::new(),
        suggestions: Vec::new(),
    };

    let Ok(metadata) = std::fs::metadata(path) else {
        diagnosis.problem("file does not exist");
        diagnosis.suggest("check the path for typos or moved files");
        return diagnosis;
    };
    diagnosis.exists = true;
    diagnosis.size = metadata.len();
    if diagnosis.size == 0 {
        diagnosis.problem("file is empty (0 bytes)");
        diagnosis.suggest("the file may be corrupted or was not fully copied");
    }

    match diagnosis.extension.as_str() {
        "pdf" => diagnose_pdf(path, caps, &mut diagnosis),
        "zip" => diagnose_zip(path, &mut diagnosis),
        "doc" | "rtf" => diagnose_legacy(caps, &mut diagnosis),
        "jpg" | "jpeg" | "png" | "bmp" | "tiff" => diagnose_image(path, caps, &mut diagnosis),
        _ => {}
    }

    diagnosis
}

fn diagnose_pdf(path: &Path, caps: &Capabilities, diagnosis: &mut Diagnosis) {
    let document = match lopdf::Document::load(path) {
        Ok(document) => document,
        Err(e) => {
            let message = e.to_string().to_lowercase();
            if message.contains("password") || message.contains("encrypt") {
                diagnosis.problem("PDF is password-protected");
                diagnosis.suggest("a password is required to open this document");
            } else {
                diagnosis.problem(format!("PDF could not be opened: {e}"));
                diagnosis.suggest("the file may be corrupted; try obtaining a fresh copy");
            }
            return;
        }
    };

    if document.is_encrypted() {
        diagnosis.problem("PDF is password-protected");
        diagnosis.suggest("a password is required to open this document");
        return;
    }

    let pages = document.get_pages();
    if pages.is_empty() {
        diagnosis.problem("PDF contains no pages");
        diagnosis.suggest("the file may be corrupted");
        return;
    }

    let has_text = pages.keys().any(|&number| {
        document
            .extract_text(&[number])
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
    });

    if has_text {
        diagnosis.suggest(format!(
            "{} pages with an embedded text layer; should extract normally",
            pages.len()
        ));
        return;
    }

    diagnosis.problem("no embedded text layer (likely a scanned document)");
    diagnosis.suggest("OCR is required to extract text");
    if !caps.ocr_available() {
        diagnosis.problem("tesseract is not installed");
        diagnosis.suggest("install tesseract ('apt install tesseract-ocr tesseract-ocr-rus')");
    } else if !caps.rasterizer_available() {
        diagnosis.problem("poppler (pdftoppm) is not installed or not on PATH");
        diagnosis.suggest("install poppler-utils for PDF rasterization");
    } else {
        diagnosis.suggest("tesseract and poppler are installed; OCR recovery should work");
    }
}

fn diagnose_zip(path: &Path, diagnosis: &mut Diagnosis) {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            diagnosis.problem(format!("archive could not be opened: {e}"));
            return;
        }
    };
    let mut archive = match zip::ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            diagnosis.problem(format!("ZIP is corrupted: {e}"));
            diagnosis.suggest("try repairing the archive or obtaining a fresh copy");
            return;
        }
    };

    if archive.is_empty() {
        diagnosis.problem("ZIP archive has no entries");
        return;
    }

    let mut supported = 0usize;
    let mut total = 0usize;
    for index in 0..archive.len() {
        let Ok(mut entry) = archive.by_index(index) else {
            diagnosis.problem("ZIP entry is unreadable; the archive may be corrupted");
            diagnosis.suggest("try repairing the archive or obtaining a fresh copy");
            return;
        };
        if entry.is_dir() {
            continue;
        }
        total += 1;
        let name = entry.name().to_lowercase();
        if [".txt", ".md", ".pdf", ".docx", ".doc", ".rtf"]
            .iter()
            .any(|ext| name.ends_with(ext))
        {
            supported += 1;
        }
        // CRC verification happens on read.
        let mut sink = std::io::sink();
        if std::io::copy(&mut entry, &mut sink).is_err() {
            diagnosis.problem("ZIP failed its integrity check");
            diagnosis.suggest("try repairing the archive or obtaining a fresh copy");
            return;
        }
    }

    if supported == 0 {
        diagnosis.problem("ZIP contains no supported file types");
        diagnosis.suggest("supported entry types: txt, md, pdf, docx, doc, rtf");
    } else {
        diagnosis.suggest(format!("{supported} of {total} entries are supported"));
    }
}

fn diagnose_legacy(caps: &Capabilities, diagnosis: &mut Diagnosis) {
    if !caps.legacy_doc_available() {
        diagnosis.problem("LibreOffice (soffice) is not installed");
        diagnosis.suggest("install LibreOffice to convert legacy .doc/.rtf documents");
    } else {
        diagnosis.suggest("LibreOffice is available; conversion should work");
    }
}

fn diagnose_image(path: &Path, caps: &Capabilities, diagnosis: &mut Diagnosis) {
    if !caps.ocr_available() {
        diagnosis.problem("tesseract is not installed");
        diagnosis.suggest("install tesseract to recognize text in images");
    }

    match image::open(path) {
        Ok(img) => {
            if img.width() < 100 || img.height() < 100 {
                diagnosis.problem(format!(
                    "image is very small ({}x{})",
                    img.width(),
                    img.height()
                ));
                diagnosis.suggest("recognition quality drops sharply below 300 DPI scans");
            }
        }
        Err(e) => {
            diagnosis.problem(format!("image could not be opened: {e}"));
            diagnosis.suggest("check the file format and integrity");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_missing_file() {
        let diagnosis = diagnose(Path::new("/nonexistent/report.pdf"), &Capabilities::none());
        assert!(!diagnosis.exists);
        assert_eq!(diagnosis.extension, "pdf");
        assert!(diagnosis.problems.iter().any(|p| p.contains("does not exist")));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("void.txt");
        std::fs::write(&path, b"").unwrap();

        let diagnosis = diagnose(&path, &Capabilities::none());
        assert!(diagnosis.exists);
        assert_eq!(diagnosis.size, 0);
        assert!(diagnosis.problems.iter().any(|p| p.contains("empty")));
    }

    #[test]
    fn test_corrupt_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let diagnosis = diagnose(&path, &Capabilities::none());
        assert!(diagnosis
            .problems
            .iter()
            .any(|p| p.contains("could not be opened")));
    }

    #[test]
    fn test_zip_supported_census() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.zip");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        writer.start_file("a.txt", options).unwrap();
        writer.write_all(b"text").unwrap();
        writer.start_file("b.mp4", options).unwrap();
        writer.write_all(b"video").unwrap();
        writer.finish().unwrap();

        let diagnosis = diagnose(&path, &Capabilities::none());
        assert!(diagnosis
            .suggestions
            .iter()
            .any(|s| s.contains("1 of 2 entries")));
    }

    #[test]
    fn test_corrupt_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"not a zip").unwrap();

        let diagnosis = diagnose(&path, &Capabilities::none());
        assert!(diagnosis.problems.iter().any(|p| p.contains("corrupted")));
    }

    #[test]
    fn test_legacy_without_converter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.doc");
        std::fs::write(&path, b"doc bytes").unwrap();

        let diagnosis = diagnose(&path, &Capabilities::none());
        assert!(diagnosis.problems.iter().any(|p| p.contains("LibreOffice")));
    }

    #[test]
    fn test_unopenable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"not an image").unwrap();

        let diagnosis = diagnose(&path, &Capabilities::none());
        assert!(diagnosis.problems.iter().any(|p| p.contains("tesseract")));
        assert!(diagnosis
            .problems
            .iter()
            .any(|p| p.contains("could not be opened")));
    }

    #[test]
    fn test_diagnosis_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, b"content").unwrap();
        let before = std::fs::read(&path).unwrap();

        let _ = diagnose(&path, &Capabilities::none());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
