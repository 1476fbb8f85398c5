//! Error types for WebDoc

use std::fmt::Display;
use thiserror::Error;

/// Extensions the reader understands, for error messages
pub(crate) const SUPPORTED_EXTENSIONS: &str = ".docx, .pdf, .xlsx, .pptx, .txt, .csv, .md, .rtf";

/// Errors that can occur while reading a document
#[derive(Debug, Error)]
pub enum DocError {
    /// Path is missing
    #[error("file_path is required")]
    MissingPath,

    /// File could not be opened or inspected
    #[error("File access failed: {0}")]
    FileAccess(String),

    /// Path lies outside every allowed directory
    #[error("access denied: {0} is outside the allowed directories")]
    NotAllowed(String),

    /// Extension is not one of the supported formats
    #[error("unsupported document format: {0} (supported: {1})")]
    UnsupportedFormat(String, &'static str),

    /// The file exists but its content could not be extracted
    #[error("Failed to read document: {0}")]
    Read(String),

    /// Requested page is past the end of the document
    #[error("page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Requested line is past the end of the page
    #[error("line {line} is out of range (page has {total} lines)")]
    LineOutOfRange { line: usize, total: usize },

    /// Background reader task did not finish
    #[error("document read interrupted: {0}")]
    Interrupted(String),
}

impl DocError {
    /// Wrap a format library error
    pub fn read(err: impl Display) -> Self {
        DocError::Read(err.to_string())
    }

    /// Unsupported extension, as written in the path
    pub fn unsupported(ext: impl Into<String>) -> Self {
        DocError::UnsupportedFormat(ext.into(), SUPPORTED_EXTENSIONS)
    }
}
