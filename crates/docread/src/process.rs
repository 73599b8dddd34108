//! Factory-backed document processing.

use std::path::Path;
use tracing::{info, warn};

use crate::error::ReadError;
use crate::factory::ReaderFactory;

/// Read the text of `path` with the reader its extension selects.
pub fn read_document(path: &Path) -> Result<String, ReadError> {
    ReaderFactory::for_path(path)?.read(path)
}

/// Read the text of `path`, returning `""` on any failure.
///
/// Failures are logged rather than propagated, so callers can treat the
/// document text as optional enrichment.
#[must_use]
pub fn process_document(path: &Path) -> String {
    let file = path.display();

    match read_document(path) {
        Ok(text) if text.is_empty() => {
            warn!(%file, "No text could be extracted from document");
            String::new()
        }
        Ok(text) => {
            let ext = crate::factory::extension_of(
                &path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            )
            .to_uppercase();
            info!(%file, format = %ext, chars = text.chars().count(), "Extracted document text");
            text
        }
        Err(ReadError::MissingExtension(_)) => {
            warn!(%file, "File has no extension, cannot pick a reader");
            String::new()
        }
        Err(ReadError::Unsupported(ext)) => {
            warn!(%file, extension = %ext, "No reader for this extension");
            String::new()
        }
        Err(e) => {
            warn!(%file, error = %e, "Failed to read document");
            String::new()
        }
    }
}
