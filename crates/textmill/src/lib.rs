//! Textmill - Multi-Strategy Document Text Extraction
//!
//! Textmill pulls text out of mixed folders of real-world documents: PDFs
//! with and without a text layer, scanned images, Office documents, plain
//! text in legacy encodings, and ZIP archives of all of the above. Its core
//! is a PDF fallback chain that escalates from cheap text-layer parsing to
//! full OCR recovery only when everything cheaper produced nothing.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use textmill::{Capabilities, DocumentEngine, EngineConfig};
//!
//! # fn main() -> textmill::Result<()> {
//! let mut engine = DocumentEngine::new(EngineConfig::default(), Capabilities::detect())?;
//! let result = engine.extract_text(std::path::Path::new("report.pdf"));
//! println!("success={} chars={}", result.success, result.text.len());
//! engine.save_cache()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): per-file orchestration, the closed format map, batch
//!   processing, result saving
//! - **Extractors** (`extractors`): one module per format family; the PDF
//!   module holds the four-stage fallback chain
//! - **Cache** (`cache`): size+mtime validated extraction result cache
//! - **Diagnose** (`diagnose`): read-only per-file failure analysis
//!
//! External tools (tesseract, poppler, LibreOffice) are probed once at
//! startup into a [`Capabilities`] record; extraction degrades gracefully
//! when they are absent.

#![deny(unsafe_code)]

pub mod cache;
pub mod cancel;
pub mod capabilities;
pub mod config;
pub mod core;
pub mod diagnose;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod ocr;

pub use cache::{CacheRecord, ResultCache};
pub use cancel::CancelToken;
pub use capabilities::Capabilities;
pub use config::EngineConfig;
pub use crate::core::batch::{process_batch, BatchReport, FormatStat};
pub use crate::core::engine::{DocumentEngine, Extraction};
pub use crate::core::formats::{family_for, is_supported, supported_extensions, FormatFamily};
pub use crate::core::output::{save_blocks, OutputKind};
pub use diagnose::{diagnose, Diagnosis};
pub use error::{Result, TextmillError};
pub use logging::ErrorLog;
