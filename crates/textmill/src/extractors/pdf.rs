//! PDF text extraction through an ordered fallback chain.
//!
//! PDFs in the wild split into text-layer documents, image-only scans and
//! encrypted/corrupt containers, and no single parsing engine handles all of
//! them. The chain tries engines cheapest-first and escalates only when a
//! whole stage produced zero non-empty pages:
//!
//! 1. pdfium (native text layer)
//! 2. pdf-extract (pure-Rust text layer, different parsing engine)
//! 3. lopdf (per-page content-stream extraction)
//! 4. OCR: rasterize with pdftoppm, recognize each page with tesseract
//!
//! Stages never mix: a file's page blocks always come from exactly one
//! engine. Encryption is terminal wherever it is detected, because swapping
//! parsers cannot open a password-protected container. Per-page failures
//! inside a stage never abort the file; an empty page is noted and skipped.
//!
//! Every stage checks the cancellation token at page boundaries. Once the
//! token is set, no further stage runs and whatever pages were already
//! collected are assembled and returned.

use crate::cancel::CancelToken;
use crate::capabilities::Capabilities;
use crate::config::EngineConfig;
use crate::{ocr, Result, TextmillError};
use std::path::Path;
use std::time::Duration;

/// One page's recovered text. `number` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Outcome of running one stage over a whole file.
#[derive(Debug)]
pub enum StageOutcome {
    /// The stage ran; pages may still all be empty.
    Pages(Vec<PageText>),
    /// The document is password-protected. Terminal for the file.
    Encrypted,
    /// The stage ran and errored; the chain moves on.
    Failed(String),
    /// The stage cannot run in this environment (missing binding or
    /// external tool); the chain moves on.
    Unavailable(String),
}

/// A single text-recovery strategy. Implementations must honor the token at
/// page boundaries and keep already-extracted pages on cancellation.
pub trait TextLayerStage {
    fn name(&self) -> &'static str;

    /// True for stages whose output came from recognition rather than an
    /// embedded text layer; assembled page labels carry an OCR tag.
    fn is_ocr(&self) -> bool {
        false
    }

    fn run(&self, path: &Path, cancel: &CancelToken) -> StageOutcome;
}

/// Extract text from a standalone PDF file through the full four-stage chain.
pub fn extract(
    path: &Path,
    caps: &Capabilities,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<String> {
    let stages: Vec<Box<dyn TextLayerStage>> = vec![
        Box::new(PdfiumStage),
        Box::new(PdfExtractStage),
        Box::new(LopdfStage),
        Box::new(OcrStage {
            caps: caps.clone(),
            config: config.clone(),
        }),
    ];
    run_chain(path, &stages, cancel, config.page_warning_threshold)
}

/// Simplified chain for PDFs materialized out of archives: one direct parse,
/// then OCR. The full escalation is not worth three parser passes on entry
/// payloads that are usually either clean exports or scans.
pub fn extract_archive_entry(
    path: &Path,
    caps: &Capabilities,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<String> {
    let stages: Vec<Box<dyn TextLayerStage>> = vec![
        Box::new(LopdfStage),
        Box::new(OcrStage {
            caps: caps.clone(),
            config: config.clone(),
        }),
    ];
    run_chain(path, &stages, cancel, config.page_warning_threshold)
}

pub(crate) fn run_chain(
    path: &Path,
    stages: &[Box<dyn TextLayerStage>],
    cancel: &CancelToken,
    page_warning_threshold: usize,
) -> Result<String> {
    let mut pages: Vec<PageText> = Vec::new();
    let mut from_ocr = false;
    let mut ocr_unavailable: Option<String> = None;

    for stage in stages {
        if cancel.is_cancelled() {
            break;
        }

        match stage.run(path, cancel) {
            StageOutcome::Pages(stage_pages) => {
                let usable = stage_pages.iter().filter(|p| !p.text.trim().is_empty());
                if usable.clone().count() > 0 {
                    tracing::debug!(
                        stage = stage.name(),
                        pages = stage_pages.len(),
                        "text recovered"
                    );
                    pages = stage_pages;
                    from_ocr = stage.is_ocr();
                    break;
                }
                tracing::debug!(stage = stage.name(), "no non-empty pages, escalating");
            }
            StageOutcome::Encrypted => {
                return Err(TextmillError::Encrypted(format!(
                    "{} is password-protected",
                    path.display()
                )));
            }
            StageOutcome::Failed(message) => {
                tracing::debug!(stage = stage.name(), %message, "stage failed, escalating");
            }
            StageOutcome::Unavailable(message) => {
                tracing::debug!(stage = stage.name(), %message, "stage unavailable, escalating");
                if stage.is_ocr() {
                    ocr_unavailable = Some(message);
                }
            }
        }
    }

    let total = pages.len();
    let blocks: Vec<String> = pages
        .iter()
        .filter(|page| !page.text.trim().is_empty())
        .map(|page| {
            if from_ocr {
                format!("--- PAGE {} (OCR) ---\n{}", page.number, page.text.trim())
            } else {
                format!("--- PAGE {} ---\n{}", page.number, page.text.trim())
            }
        })
        .collect();

    if blocks.is_empty() {
        if let Some(hint) = ocr_unavailable {
            return Err(TextmillError::MissingDependency(format!(
                "{} has no embedded text layer and OCR is not available. {hint}",
                path.display()
            )));
        }
        return Err(TextmillError::NoUsableText(format!(
            "no extractable text in {}; the document likely contains only images",
            path.display()
        )));
    }

    let body = blocks.join("\n\n");
    if total > page_warning_threshold {
        Ok(format!(
            "[NOTE: large document, {total} pages - processing may be slow]\n\n{body}"
        ))
    } else {
        Ok(body)
    }
}

/// Stage 1: pdfium's text layer.
struct PdfiumStage;

impl TextLayerStage for PdfiumStage {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn run(&self, path: &Path, cancel: &CancelToken) -> StageOutcome {
        use once_cell::sync::Lazy;
        use pdfium_render::prelude::*;

        // Binding the system library is done once per process; a missing
        // library stays missing for the session.
        static PDFIUM: Lazy<Option<Pdfium>> =
            Lazy::new(|| Pdfium::bind_to_system_library().ok().map(Pdfium::new));

        let Some(pdfium) = PDFIUM.as_ref() else {
            return StageOutcome::Unavailable("pdfium library not found".to_string());
        };

        let document = match pdfium.load_pdf_from_file(path, None) {
            Ok(document) => document,
            Err(e) => {
                let message = e.to_string();
                // pdfium reports protected documents only through the error
                // text; a tagged encryption flag is checked at stage 3.
                if message.to_lowercase().contains("password") {
                    return StageOutcome::Encrypted;
                }
                return StageOutcome::Failed(message);
            }
        };

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let number = index as u32 + 1;
            let text = page
                .text()
                .map(|t| t.all())
                .unwrap_or_default();
            if text.trim().is_empty() {
                let images = page
                    .objects()
                    .iter()
                    .filter(|object| object.as_image_object().is_some())
                    .count();
                if images > 0 {
                    tracing::debug!(page = number, images, "empty text layer, OCR candidate");
                }
            }
            pages.push(PageText { number, text });
        }
        StageOutcome::Pages(pages)
    }
}

/// Stage 2: pdf-extract's whole-document text, split on form feeds.
struct PdfExtractStage;

impl TextLayerStage for PdfExtractStage {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn run(&self, path: &Path, cancel: &CancelToken) -> StageOutcome {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return StageOutcome::Failed(e.to_string()),
        };

        // The library panics on some malformed files; contain that to a
        // stage failure so the chain can escalate.
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes));
        let text = match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return StageOutcome::Failed(e.to_string()),
            Err(_) => return StageOutcome::Failed("parser panicked".to_string()),
        };

        let mut pages = Vec::new();
        for (index, chunk) in text.split('\u{0C}').enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            pages.push(PageText {
                number: index as u32 + 1,
                text: chunk.to_string(),
            });
        }
        StageOutcome::Pages(pages)
    }
}

/// Stage 3: lopdf per-page extraction, with an explicit encryption check.
struct LopdfStage;

impl TextLayerStage for LopdfStage {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn run(&self, path: &Path, cancel: &CancelToken) -> StageOutcome {
        let document = match lopdf::Document::load(path) {
            Ok(document) => document,
            Err(e) => return StageOutcome::Failed(e.to_string()),
        };
        if document.is_encrypted() {
            return StageOutcome::Encrypted;
        }

        let mut pages = Vec::new();
        for (&number, _) in document.get_pages().iter() {
            if cancel.is_cancelled() {
                break;
            }
            // Per-page extraction errors count as empty pages, not failures.
            let text = document.extract_text(&[number]).unwrap_or_default();
            pages.push(PageText { number, text });
        }
        StageOutcome::Pages(pages)
    }
}

/// Stage 4: rasterize with pdftoppm and recognize each page with tesseract.
struct OcrStage {
    caps: Capabilities,
    config: EngineConfig,
}

impl TextLayerStage for OcrStage {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn is_ocr(&self) -> bool {
        true
    }

    fn run(&self, path: &Path, cancel: &CancelToken) -> StageOutcome {
        let Some(tesseract) = self.caps.tesseract.as_deref() else {
            return StageOutcome::Unavailable(
                "Install tesseract ('apt install tesseract-ocr tesseract-ocr-rus')."
                    .to_string(),
            );
        };
        let Some(pdftoppm) = self.caps.pdftoppm.as_deref() else {
            return StageOutcome::Unavailable(
                "Install poppler-utils for PDF rasterization ('apt install poppler-utils')."
                    .to_string(),
            );
        };

        let raster_dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => return StageOutcome::Failed(e.to_string()),
        };
        let page_images =
            match ocr::rasterize_pdf(pdftoppm, path, raster_dir.path(), self.config.pdf_dpi) {
                Ok(images) => images,
                Err(e) => return StageOutcome::Failed(e.to_string()),
            };

        let timeout = Duration::from_secs(self.config.ocr_timeout_secs);
        let mut pages = Vec::new();
        for (index, image) in page_images.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let number = index as u32 + 1;
            let text = match ocr::recognize_image(
                tesseract,
                image,
                &self.config.ocr_languages,
                Some(timeout),
            ) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(page = number, error = %e, "page OCR failed, skipping");
                    String::new()
                }
            };
            pages.push(PageText { number, text });
        }
        StageOutcome::Pages(pages)
    }
}
