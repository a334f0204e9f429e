//! Saving accumulated result blocks.
//!
//! Two output kinds: a plain-text file with blocks joined by newlines, and a
//! minimal OOXML word-processor document with one paragraph per line. The
//! OOXML package is assembled by hand over the zip writer; the three parts
//! written ([Content_Types].xml, _rels/.rels, word/document.xml) are the
//! smallest set word processors accept.

use crate::Result;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    PlainText,
    Docx,
}

impl OutputKind {
    /// Kind implied by a destination path's extension; `.docx` selects the
    /// word-processor document, anything else plain text.
    pub fn for_path(path: &Path) -> Self {
        match crate::core::formats::extension_of(path).as_deref() {
            Some("docx") => OutputKind::Docx,
            _ => OutputKind::PlainText,
        }
    }
}

pub fn save_blocks(blocks: &[String], path: &Path, kind: OutputKind) -> Result<()> {
    match kind {
        OutputKind::PlainText => {
            std::fs::write(path, blocks.join("\n"))?;
        }
        OutputKind::Docx => {
            write_docx(blocks, path)?;
        }
    }
    tracing::info!(path = %path.display(), blocks = blocks.len(), "results saved");
    Ok(())
}

fn write_docx(blocks: &[String], path: &Path) -> Result<()> {
    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    let mut body = String::new();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            body.push_str("<w:p/>");
        }
        for line in block.lines() {
            body.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
            body.push_str(&escape_xml(line));
            body.push_str("</w:t></w:r></w:p>");
        }
    }
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(RELS.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;
    zip.finish()?;
    Ok(())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
