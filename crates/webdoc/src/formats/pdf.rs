//! PDF text, one page per PDF page

use lopdf::{Dictionary, Object};
use std::path::Path;
use tracing::warn;

use crate::error::DocError;
use crate::types::{Document, DocumentKind};

pub fn load(path: &Path) -> Result<Document, DocError> {
    let pdf = lopdf::Document::load(path).map_err(DocError::read)?;

    let mut pages = Vec::new();
    for number in pdf.get_pages().keys() {
        let text = match pdf.extract_text(&[*number]) {
            Ok(text) => text.trim_end().to_string(),
            Err(e) => {
                // Keep the page so page numbers stay aligned
                warn!(page = *number, error = %e, "could not extract PDF page text");
                String::new()
            }
        };
        pages.push((None, text));
    }

    let mut doc = Document::paged(DocumentKind::Pdf, pages);
    doc.metadata
        .insert("pages".to_string(), doc.pages.len().to_string());
    if let Some(info) = info_dictionary(&pdf) {
        for (key, name) in [("Title", "title"), ("Author", "author"), ("Subject", "subject")] {
            if let Some(value) = info.get(key.as_bytes()).ok().and_then(pdf_string) {
                doc.metadata.insert(name.to_string(), value);
            }
        }
    }
    Ok(doc)
}

fn info_dictionary(pdf: &lopdf::Document) -> Option<&Dictionary> {
    match pdf.trailer.get(b"Info").ok()? {
        Object::Reference(id) => pdf.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Text string: UTF-16BE with a byte-order mark, otherwise Latin-1
fn pdf_string(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    let text = match bytes.strip_prefix(&[0xfe, 0xff]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    #[test]
    fn test_pdf_string() {
        let latin = Object::String(b"Caf\xe9".to_vec(), StringFormat::Literal);
        assert_eq!(pdf_string(&latin).as_deref(), Some("Caf\u{e9}"));

        let utf16 = Object::String(
            vec![0xfe, 0xff, 0x00, b'H', 0x00, b'i'],
            StringFormat::Hexadecimal,
        );
        assert_eq!(pdf_string(&utf16).as_deref(), Some("Hi"));

        assert_eq!(pdf_string(&Object::Integer(3)), None);
        assert_eq!(
            pdf_string(&Object::String(b"  ".to_vec(), StringFormat::Literal)),
            None
        );
    }
}
