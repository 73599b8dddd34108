//! The reader trait shared by every document format.

use std::fmt;
use std::path::Path;

use crate::error::ReadError;

/// Document formats with a text reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Txt,
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Canonical lowercase extension for this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts the plain text of one document format.
pub trait DocumentReader: Send + Sync {
    /// Format handled by this reader.
    fn kind(&self) -> DocumentKind;

    /// Read the whole text content of the file at `path`.
    fn read(&self, path: &Path) -> Result<String, ReadError>;
}

/// Fail with [`ReadError::NotFound`] unless `path` is a regular file.
pub(crate) fn ensure_file(path: &Path) -> Result<(), ReadError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReadError::NotFound(path.to_path_buf()))
    }
}
