//! The closed extension map.
//!
//! Every recognized extension belongs to exactly one family; anything else
//! is unsupported. Matching is on the lowercased extension only, never on
//! content sniffing.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFamily {
    Image,
    Document,
    Pdf,
    Text,
    Archive,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];
const DOCUMENT_EXTENSIONS: &[&str] = &["docx", "doc", "rtf"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];

/// Lowercased extension of `path`, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

pub fn family_for(path: &Path) -> Option<FormatFamily> {
    let ext = extension_of(path)?;
    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        Some(FormatFamily::Image)
    } else if DOCUMENT_EXTENSIONS.contains(&ext) {
        Some(FormatFamily::Document)
    } else if PDF_EXTENSIONS.contains(&ext) {
        Some(FormatFamily::Pdf)
    } else if TEXT_EXTENSIONS.contains(&ext) {
        Some(FormatFamily::Text)
    } else if ARCHIVE_EXTENSIONS.contains(&ext) {
        Some(FormatFamily::Archive)
    } else {
        None
    }
}

pub fn is_supported(path: &Path) -> bool {
    family_for(path).is_some()
}

/// Every recognized extension, for folder filtering and help text.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut all = Vec::new();
    all.extend_from_slice(IMAGE_EXTENSIONS);
    all.extend_from_slice(DOCUMENT_EXTENSIONS);
    all.extend_from_slice(PDF_EXTENSIONS);
    all.extend_from_slice(TEXT_EXTENSIONS);
    all.extend_from_slice(ARCHIVE_EXTENSIONS);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert_eq!(family_for(Path::new("a.png")), Some(FormatFamily::Image));
        assert_eq!(family_for(Path::new("a.docx")), Some(FormatFamily::Document));
        assert_eq!(family_for(Path::new("a.rtf")), Some(FormatFamily::Document));
        assert_eq!(family_for(Path::new("a.pdf")), Some(FormatFamily::Pdf));
        assert_eq!(family_for(Path::new("a.md")), Some(FormatFamily::Text));
        assert_eq!(family_for(Path::new("a.7z")), Some(FormatFamily::Archive));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(family_for(Path::new("REPORT.PDF")), Some(FormatFamily::Pdf));
        assert_eq!(family_for(Path::new("Scan.JPeG")), Some(FormatFamily::Image));
    }

    #[test]
    fn test_unknown_and_missing_extensions() {
        assert_eq!(family_for(Path::new("a.xlsx")), None);
        assert_eq!(family_for(Path::new("Makefile")), None);
        assert!(!is_supported(Path::new("a.exe")));
    }

    #[test]
    fn test_supported_extensions_is_closed_list() {
        let all = supported_extensions();
        assert_eq!(all.len(), 14);
        assert!(all.contains(&"tiff"));
        assert!(!all.contains(&"xlsx"));
    }
}
