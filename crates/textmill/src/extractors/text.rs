//! Plain text and Markdown extraction.
//!
//! Decoding tries a fixed ladder of encodings against the whole file and
//! returns the first clean decode: UTF-8, then windows-1251 (the dominant
//! legacy Cyrillic encoding in the corpus this engine serves), then
//! windows-1252. Single-byte decodes in `encoding_rs` never hard-fail (the
//! WHATWG index is total), so a decode that produced replacement characters
//! or C1 control characters counts as a failed attempt. There is no
//! partial-decode fallback.

use crate::{Result, TextmillError};
use std::path::Path;

/// Decode a whole file through the encoding ladder.
pub fn extract(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    decode(&bytes).ok_or_else(|| {
        TextmillError::parsing(format!(
            "could not decode {} as utf-8, windows-1251 or windows-1252",
            path.display()
        ))
    })
}

/// The same ladder over in-memory bytes, for archive entries.
pub fn decode(bytes: &[u8]) -> Option<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    let (text, _, had_errors) = encoding_rs::WINDOWS_1251.decode(bytes);
    if !had_errors && !text.contains('\u{FFFD}') {
        return Some(text.into_owned());
    }

    // windows-1252 maps every byte to something (unassigned bytes become C1
    // controls), so the rung must reject those to be able to fail at all.
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if !had_errors && !text.chars().any(is_c1_control) {
        return Some(text.into_owned());
    }

    None
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9F}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "Hello\nWorld").unwrap();
        assert_eq!(extract(&path).unwrap(), "Hello\nWorld");
    }

    #[test]
    fn test_utf8_cyrillic_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "привет мир").unwrap();
        assert_eq!(extract(&path).unwrap(), "привет мир");
    }

    #[test]
    fn test_cp1251_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        // "привет" encoded as windows-1251.
        std::fs::write(&path, [0xEF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]).unwrap();
        assert_eq!(extract(&path).unwrap(), "привет");
    }

    #[test]
    fn test_windows1252_fallback() {
        // 0xE9 is é in windows-1252 and a valid Cyrillic letter in cp1251,
        // so the ladder resolves it at the cp1251 rung; either way decode
        // succeeds.
        assert!(decode(&[0x63, 0x61, 0x66, 0xE9]).is_some());
    }

    #[test]
    fn test_bytes_rejected_by_every_rung() {
        // Invalid utf-8, unassigned in cp1251 (0x98) and mapping to C1
        // controls in windows-1252 (0x81, 0x8D).
        assert!(decode(&[0x98, 0x81, 0x8D]).is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extract(Path::new("/nonexistent/note.txt")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
