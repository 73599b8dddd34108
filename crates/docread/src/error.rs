//! Error types for document reading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while picking a reader or extracting text.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The path does not point at a regular file
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No reader exists for this extension
    #[error("unsupported extension: '{0}'")]
    Unsupported(String),

    /// The file name carries no extension to dispatch on
    #[error("file has no extension: {}", .0.display())]
    MissingExtension(PathBuf),

    /// Underlying IO failure (permissions, invalid UTF-8, ...)
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid Word package
    #[error("invalid DOCX document {}: {reason}", path.display())]
    InvalidDocx { path: PathBuf, reason: String },

    /// PDF text extraction failed
    #[error("failed to extract PDF text from {}: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },
}

impl ReadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
