//! Plain UTF-8 text files.

use std::path::Path;

use crate::error::ReadError;
use crate::reader::{ensure_file, DocumentKind, DocumentReader};

/// Reader for `.txt` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TxtReader;

impl DocumentReader for TxtReader {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Txt
    }

    fn read(&self, path: &Path) -> Result<String, ReadError> {
        ensure_file(path)?;
        std::fs::read_to_string(path).map_err(|e| ReadError::io(path, e))
    }
}
