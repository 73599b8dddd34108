//! PDF documents.

use std::path::Path;

use crate::error::ReadError;
use crate::reader::{ensure_file, DocumentKind, DocumentReader};

/// Reader for `.pdf` files, extracting the text of every page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn read(&self, path: &Path) -> Result<String, ReadError> {
        ensure_file(path)?;

        pdf_extract::extract_text(path).map_err(|e| ReadError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
