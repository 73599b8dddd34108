//! Reader Factory
//!
//! Factory for creating document readers based on file extension.

use std::path::Path;
use tracing::debug;

use crate::error::ReadError;
use crate::reader::{DocumentKind, DocumentReader};
use crate::readers::{DocxReader, PdfReader, TxtReader};

/// Text after the last `.` of `name`, or `""` when there is none.
///
/// The extension keeps its original case; the factory lowercases it.
#[must_use]
pub fn extension_of(name: &str) -> &str {
    name.rfind('.').map_or("", |idx| &name[idx + 1..])
}

/// Factory for creating document readers
pub struct ReaderFactory;

impl ReaderFactory {
    /// Create the reader for an extension (case-insensitive, without the dot)
    pub fn for_extension(extension: &str) -> Result<Box<dyn DocumentReader>, ReadError> {
        let reader: Box<dyn DocumentReader> = match extension.to_lowercase().as_str() {
            "pdf" => Box::new(PdfReader),
            "txt" => Box::new(TxtReader),
            "docx" | "doc" => Box::new(DocxReader),
            _ => return Err(ReadError::Unsupported(extension.to_string())),
        };

        debug!(extension, kind = %reader.kind(), "Created document reader");
        Ok(reader)
    }

    /// Create the reader matching the extension of `path`
    pub fn for_path(path: &Path) -> Result<Box<dyn DocumentReader>, ReadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        match extension_of(&name) {
            "" => Err(ReadError::MissingExtension(path.to_path_buf())),
            ext => Self::for_extension(ext),
        }
    }

    /// Extensions the factory can dispatch
    pub fn supported_extensions() -> Vec<&'static str> {
        vec!["pdf", "txt", "docx", "doc"]
    }

    /// Check if an extension is supported
    pub fn is_supported(extension: &str) -> bool {
        Self::supported_extensions().contains(&extension.to_lowercase().as_str())
    }

    /// Formats reachable through the factory
    pub fn supported_kinds() -> Vec<DocumentKind> {
        vec![DocumentKind::Pdf, DocumentKind::Txt, DocumentKind::Docx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("HU_login.docx"), "docx");
        assert_eq!(extension_of("archive.tar.GZ"), "GZ");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_create_readers() {
        assert_eq!(
            ReaderFactory::for_extension("pdf").unwrap().kind(),
            DocumentKind::Pdf
        );
        assert_eq!(
            ReaderFactory::for_extension("TXT").unwrap().kind(),
            DocumentKind::Txt
        );
        assert_eq!(
            ReaderFactory::for_extension("doc").unwrap().kind(),
            DocumentKind::Docx
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ReaderFactory::for_extension("xlsx").err().unwrap();
        assert!(matches!(err, ReadError::Unsupported(ext) if ext == "xlsx"));
    }

    #[test]
    fn test_for_path_without_extension() {
        let err = ReaderFactory::for_path(Path::new("/tmp/HU_sin_extension"))
            .err()
            .unwrap();
        assert!(matches!(err, ReadError::MissingExtension(_)));
    }

    #[test]
    fn test_supported() {
        assert!(ReaderFactory::is_supported("DOCX"));
        assert!(!ReaderFactory::is_supported("xls"));
        assert_eq!(ReaderFactory::supported_kinds().len(), 3);
    }
}
