//! Office Open XML documents (docx, pptx)

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::error::DocError;
use crate::types::{Document, DocumentKind, Metadata};

type Archive = ZipArchive<File>;

pub fn load_docx(path: &Path) -> Result<Document, DocError> {
    let mut archive = open(path)?;
    let body = read_entry(&mut archive, "word/document.xml")?
        .ok_or_else(|| DocError::read("word/document.xml is missing"))?;

    let mut doc = Document::single(DocumentKind::Docx, paragraphs(&body)?);
    doc.metadata = core_properties(&mut archive)?;
    Ok(doc)
}

pub fn load_pptx(path: &Path) -> Result<Document, DocError> {
    let mut archive = open(path)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| Some((slide_number(name)?, name.to_string())))
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut pages = Vec::with_capacity(slides.len());
    for (_, name) in &slides {
        let xml = read_entry(&mut archive, name)?.unwrap_or_default();
        pages.push((None, paragraphs(&xml)?));
    }

    let mut doc = Document::paged(DocumentKind::Pptx, pages);
    doc.metadata = core_properties(&mut archive)?;
    doc.metadata
        .insert("slide_count".to_string(), slides.len().to_string());
    Ok(doc)
}

fn open(path: &Path) -> Result<Archive, DocError> {
    let file = File::open(path).map_err(DocError::read)?;
    ZipArchive::new(file).map_err(DocError::read)
}

fn read_entry(archive: &mut Archive, name: &str) -> Result<Option<String>, DocError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(DocError::read(e)),
    };
    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(DocError::read)?;
    Ok(Some(xml))
}

/// `ppt/slides/slide12.xml` => 12
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Text of every `<*:p>` paragraph, one per line
///
/// Only `<*:t>` runs count as text; `<*:tab>` and `<*:br>` map to a tab
/// and a line break. Empty paragraphs are kept as empty lines.
fn paragraphs(xml: &str) -> Result<String, DocError> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(DocError::read)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                b"p" => lines.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().map_err(DocError::read)?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if in_paragraph => {
                    in_paragraph = false;
                    lines.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

/// Title and author from `docProps/core.xml`
fn core_properties(archive: &mut Archive) -> Result<Metadata, DocError> {
    let mut metadata = Metadata::new();
    let Some(xml) = read_entry(archive, "docProps/core.xml")? else {
        return Ok(metadata);
    };

    let mut reader = Reader::from_str(&xml);
    let mut field: Option<&'static str> = None;
    loop {
        match reader.read_event().map_err(DocError::read)? {
            Event::Start(e) => {
                field = match e.local_name().as_ref() {
                    b"title" => Some("title"),
                    b"creator" => Some("author"),
                    b"subject" => Some("subject"),
                    b"lastModifiedBy" => Some("last_modified_by"),
                    _ => None,
                };
            }
            Event::Text(t) => {
                if let Some(key) = field {
                    let value = t.unescape().map_err(DocError::read)?;
                    if !value.trim().is_empty() {
                        metadata.insert(key.to_string(), value.trim().to_string());
                    }
                }
            }
            Event::End(_) => field = None,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b &amp; c</w:t></w:r></w:p>
<w:p><w:r><w:instrText>HYPERLINK</w:instrText></w:r></w:p>
</w:body></w:document>"#;
        assert_eq!(paragraphs(xml).unwrap(), "Hello world\n\na\tb & c\n");
    }

    #[test]
    fn test_slide_number() {
        assert_eq!(slide_number("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }
}
