//! Error types for textmill.
//!
//! All fallible operations return [`Result`], an alias over [`TextmillError`].
//! The enum distinguishes the per-file outcomes the engine reports to callers:
//!
//! - `MissingDependency` - an optional external toolchain (tesseract, poppler,
//!   LibreOffice) is not installed; carries a remediation hint and is never
//!   retried automatically
//! - `Encrypted` - a password-protected PDF; terminal for that file, no
//!   further fallback stage is attempted
//! - `Corrupted` - archive integrity failure or an unreadable document
//! - `EmptyInput` - zero-byte file or archive without entries
//! - `NoUsableText` - every applicable stage ran cleanly but produced no
//!   non-blank text; distinct from a raised error and never cached
//! - `UnsupportedFormat` - recognized extension with no implemented handler
//!
//! System errors (`Io`) always bubble up unchanged; application errors are
//! wrapped with context and, where available, a `#[source]` chain.

use thiserror::Error;

/// Result type alias using `TextmillError`.
pub type Result<T> = std::result::Result<T, TextmillError>;

/// Main error type for all textmill operations.
#[derive(Debug, Error)]
pub enum TextmillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Encrypted document: {0}")]
    Encrypted(String),

    #[error("Corrupted input: {0}")]
    Corrupted(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("No usable text: {0}")]
    NoUsableText(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TextmillError {
    fn from(err: serde_json::Error) -> Self {
        TextmillError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<zip::result::ZipError> for TextmillError {
    fn from(err: zip::result::ZipError) -> Self {
        TextmillError::Corrupted(err.to_string())
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pub fn $name<S: Into<String>>(message: S) -> Self {
            Self::$variant {
                message: message.into(),
                source: None,
            }
        }
    };
}

impl TextmillError {
    error_constructor!(parsing, Parsing);
    error_constructor!(ocr, Ocr);
    error_constructor!(cache, Cache);
    error_constructor!(serialization, Serialization);

    pub fn parsing_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parsing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Short classifier used by the error log and batch statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parsing { .. } => "parsing",
            Self::Ocr { .. } => "ocr",
            Self::Cache { .. } => "cache",
            Self::Serialization { .. } => "serialization",
            Self::MissingDependency(_) => "missing-dependency",
            Self::Encrypted(_) => "encrypted",
            Self::Corrupted(_) => "corrupted",
            Self::EmptyInput(_) => "empty-input",
            Self::NoUsableText(_) => "no-usable-text",
            Self::UnsupportedFormat(_) => "unsupported-format",
            Self::Other(_) => "other",
        }
    }
}
