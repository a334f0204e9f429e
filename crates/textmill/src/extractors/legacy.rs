//! Legacy document (.doc / .rtf) extraction via LibreOffice.
//!
//! These formats are handled by delegating whole-file conversion to a
//! headless `soffice` run writing plain text into a scoped temporary
//! directory. There is no chunking and no partial recovery: the converter's
//! output is returned verbatim after decoding. When LibreOffice is not
//! installed the extractor fails immediately with a capability-missing error
//! naming both extensions.

use crate::capabilities::Capabilities;
use crate::{Result, TextmillError};
use std::path::Path;
use std::process::Command;

fn install_message() -> String {
    "LibreOffice (soffice) is required for legacy .doc/.rtf support. \
     Install: Linux: 'apt install libreoffice', macOS: 'brew install --cask libreoffice', \
     Windows: 'winget install LibreOffice.LibreOffice'."
        .to_string()
}

pub fn extract(path: &Path, caps: &Capabilities) -> Result<String> {
    let Some(soffice) = caps.soffice.as_deref() else {
        return Err(TextmillError::MissingDependency(install_message()));
    };

    // Temp dir is removed on every exit path when the guard drops.
    let out_dir = tempfile::tempdir()?;

    let output = Command::new(soffice)
        .arg("--headless")
        .arg("--convert-to")
        .arg("txt:Text")
        .arg("--outdir")
        .arg(out_dir.path())
        .arg(path)
        .output()
        .map_err(|e| TextmillError::parsing(format!("failed to start soffice: {e}")))?;

    if !output.status.success() {
        return Err(TextmillError::parsing(format!(
            "soffice conversion failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let stem = path
        .file_stem()
        .ok_or_else(|| TextmillError::parsing(format!("no file stem in {}", path.display())))?;
    let converted = out_dir.path().join(stem).with_extension("txt");
    if !converted.exists() {
        return Err(TextmillError::parsing(format!(
            "soffice produced no output for {}",
            path.display()
        )));
    }

    super::text::extract(&converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_capability_names_both_extensions() {
        let err = extract(Path::new("old.doc"), &Capabilities::none()).unwrap_err();
        assert_eq!(err.kind(), "missing-dependency");
        let message = err.to_string();
        assert!(message.contains(".doc"));
        assert!(message.contains(".rtf"));
    }
}
