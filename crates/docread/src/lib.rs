//! Plain-text extraction for the document formats HU attachments arrive in.
//!
//! # Usage
//!
//! ```no_run
//! use docread::{process_document, ReaderFactory};
//! use std::path::Path;
//!
//! // Strict: dispatch on the extension and surface every failure.
//! let reader = ReaderFactory::for_extension("docx")?;
//! let text = reader.read(Path::new("HU_login.docx"))?;
//!
//! // Lenient: log failures and fall back to an empty string.
//! let text = process_document(Path::new("HU_login.pdf"));
//! # Ok::<(), docread::ReadError>(())
//! ```
//!
//! # Architecture
//!
//! - [`DocumentReader`] trait defines the interface for one format
//! - [`TxtReader`], [`DocxReader`] and [`PdfReader`] implement it
//! - [`ReaderFactory`] picks the reader for an extension or path

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod factory;
pub mod process;
pub mod reader;
pub mod readers;

pub use error::ReadError;
pub use factory::{extension_of, ReaderFactory};
pub use process::{process_document, read_document};
pub use reader::{DocumentKind, DocumentReader};
pub use readers::{DocxReader, PdfReader, TxtReader};
