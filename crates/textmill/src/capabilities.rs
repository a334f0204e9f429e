//! Startup probing of optional external toolchains.
//!
//! Three external programs gate extraction paths:
//!
//! - `tesseract` - OCR for images and scanned PDFs
//! - `pdftoppm` (poppler) - PDF page rasterization for OCR recovery
//! - `soffice` (LibreOffice) - legacy `.doc`/`.rtf` conversion
//!
//! Each is resolved exactly once, at process start, by probing a fixed list
//! of conventional install locations and then falling back to a PATH-based
//! `--version` invocation. The result is an immutable [`Capabilities`] record
//! passed by reference into the engine; extraction code never re-probes.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const TESSERACT_CANDIDATES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const PDFTOPPM_CANDIDATES: &[&str] = &[
    "/usr/bin/pdftoppm",
    "/usr/local/bin/pdftoppm",
    "/opt/homebrew/bin/pdftoppm",
    r"C:\poppler\bin\pdftoppm.exe",
    r"C:\Program Files\poppler\bin\pdftoppm.exe",
];

const SOFFICE_CANDIDATES: &[&str] = &[
    "/usr/bin/soffice",
    "/usr/local/bin/soffice",
    "/opt/homebrew/bin/soffice",
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    r"C:\Program Files\LibreOffice\program\soffice.exe",
];

/// Immutable record of which optional toolchains are usable this session.
///
/// A `Some` value is the resolved executable path.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub tesseract: Option<PathBuf>,
    pub pdftoppm: Option<PathBuf>,
    pub soffice: Option<PathBuf>,
}

impl Capabilities {
    /// Probe all toolchains. Intended to be called once at startup.
    pub fn detect() -> Self {
        let caps = Self {
            tesseract: resolve_tool("tesseract", TESSERACT_CANDIDATES),
            pdftoppm: resolve_tool("pdftoppm", PDFTOPPM_CANDIDATES),
            soffice: resolve_tool("soffice", SOFFICE_CANDIDATES),
        };
        tracing::info!(
            ocr = caps.ocr_available(),
            rasterizer = caps.rasterizer_available(),
            legacy_doc = caps.legacy_doc_available(),
            "resolved external capabilities"
        );
        caps
    }

    /// A record with nothing available, for tests and degraded sessions.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ocr_available(&self) -> bool {
        self.tesseract.is_some()
    }

    pub fn rasterizer_available(&self) -> bool {
        self.pdftoppm.is_some()
    }

    pub fn legacy_doc_available(&self) -> bool {
        self.soffice.is_some()
    }
}

/// Fixed install locations first, then a PATH probe via `--version`.
fn resolve_tool(name: &str, candidates: &[&str]) -> Option<PathBuf> {
    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            tracing::debug!(tool = name, path = %path.display(), "found at fixed location");
            return Some(path.to_path_buf());
        }
    }

    let probe = Command::new(name)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match probe {
        Ok(status) if status.success() => {
            tracing::debug!(tool = name, "found via PATH");
            Some(PathBuf::from(name))
        }
        _ => {
            tracing::debug!(tool = name, "not available");
            None
        }
    }
}
