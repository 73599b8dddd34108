//! Word (`.docx`) documents.
//!
//! A DOCX file is a zip package; the body text lives in `word/document.xml`
//! as WordprocessingML. Body-level paragraphs (`w:p`) are joined with
//! newlines and the text runs (`w:t`) inside a paragraph are concatenated.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::error::ReadError;
use crate::reader::{ensure_file, DocumentKind, DocumentReader};

/// Path of the main document part inside the package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Reader for `.docx` (and `.doc` routed here by the factory) files.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxReader;

impl DocumentReader for DocxReader {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Docx
    }

    fn read(&self, path: &Path) -> Result<String, ReadError> {
        ensure_file(path)?;

        let file = File::open(path).map_err(|e| ReadError::io(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| invalid(path, e))?;
        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| invalid(path, e))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| ReadError::io(path, e))?;

        let paragraphs = paragraphs_from_xml(&xml).map_err(|e| invalid(path, e))?;
        tracing::debug!(
            path = %path.display(),
            paragraphs = paragraphs.len(),
            "Extracted DOCX paragraphs"
        );
        Ok(paragraphs.join("\n"))
    }
}

fn invalid(path: &Path, reason: impl ToString) -> ReadError {
    ReadError::InvalidDocx {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Subtrees whose content is not paragraph text: paragraph and run
/// properties (tab stop definitions live there), tables, text boxes and the
/// legacy copy of alternate content.
const SKIPPED: &[&[u8]] = &[
    b"w:pPr",
    b"w:rPr",
    b"w:tbl",
    b"w:txbxContent",
    b"mc:Fallback",
];

/// Collect the text of every body-level paragraph in a `document.xml` body.
///
/// Only content inside runs (`w:r`) counts: `w:t` text, `w:tab` as `\t`,
/// `w:br`/`w:cr` as `\n`.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // Depth inside a skipped subtree; 0 when outside.
    let mut skip = 0usize;
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(_) if skip > 0 => skip += 1,
            Event::End(_) if skip > 0 => skip -= 1,
            Event::Start(e) => match e.name().as_ref() {
                name if SKIPPED.contains(&name) => skip = 1,
                b"w:p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:r" if in_paragraph => in_run = true,
                b"w:t" if in_run => in_text = true,
                _ => {}
            },
            Event::Empty(_) if skip > 0 => {}
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text && skip == 0 => current.push_str(&t.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" if in_paragraph => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                    in_run = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
