//! Text extraction per document format

mod ooxml;
mod pdf;
mod rtf;
mod sheet;

use std::path::Path;
use tracing::debug;

use crate::error::DocError;
use crate::types::{Document, DocumentKind};

pub use rtf::rtf_to_text;

/// Read a document and extract its text, page by page
pub fn load(path: &Path) -> Result<Document, DocError> {
    let kind = DocumentKind::from_path(path)?;

    let doc = match kind {
        DocumentKind::Text | DocumentKind::Csv | DocumentKind::Markdown => {
            Document::single(kind, read_text(path)?)
        }
        DocumentKind::Rtf => Document::single(kind, rtf_to_text(&read_text(path)?)),
        DocumentKind::Docx => ooxml::load_docx(path)?,
        DocumentKind::Pptx => ooxml::load_pptx(path)?,
        DocumentKind::Xlsx => sheet::load(path)?,
        DocumentKind::Pdf => pdf::load(path)?,
    };

    debug!(
        path = %path.display(),
        ?kind,
        pages = doc.pages.len(),
        "document extracted"
    );
    Ok(doc)
}

/// Plain text, tolerating stray invalid bytes and a byte-order mark
fn read_text(path: &Path) -> Result<String, DocError> {
    let bytes = std::fs::read(path).map_err(DocError::read)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}
