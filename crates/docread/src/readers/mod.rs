//! Concrete `DocumentReader` implementations.

pub mod docx;
pub mod pdf;
pub mod txt;

pub use docx::DocxReader;
pub use pdf::PdfReader;
pub use txt::TxtReader;
