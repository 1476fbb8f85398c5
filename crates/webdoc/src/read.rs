//! Document reads: info, page ranges, line ranges and budgeted reads

use std::ops::Range;
use std::path::Path;
use tracing::debug;

use crate::error::DocError;
use crate::formats;
use crate::types::{
    DocumentInfoResponse, DocumentKind, PageDetail, ReadLinesResponse, ReadPagesResponse,
    ReadStrategy, SmartReadRequest, SmartReadResponse,
};

const MIDDLE_MARKER: &str = "\n\n... [middle section] ...\n\n";
const LATER_MARKER: &str = "\n\n... [later section] ...\n\n";

/// Below this many characters of budget (after markers) sampling is not
/// worth it and the start is returned instead
const MIN_SAMPLE_CHARS: usize = 300;

/// File type, size, page counts and metadata
///
/// Never fails: a file that exists but cannot be parsed still reports its
/// type and size alongside the error.
pub fn document_info(path: &Path) -> DocumentInfoResponse {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return DocumentInfoResponse::from_error(&DocError::FileAccess(e.to_string())),
    };

    let mut info = DocumentInfoResponse {
        file_path: path.display().to_string(),
        file_type: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_uppercase(),
        file_size: format_file_size(size),
        ..Default::default()
    };

    let doc = match formats::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            info.error_message = Some(e.to_string());
            return info;
        }
    };

    info.estimated_size = format!("Approx {} characters", doc.content().chars().count());
    match doc.kind {
        DocumentKind::Pdf | DocumentKind::Pptx => info.total_pages = Some(doc.pages.len()),
        DocumentKind::Xlsx => {
            info.sheet_names = doc.pages.iter().filter_map(|p| p.name.clone()).collect();
            info.total_sheets = Some(info.sheet_names.len());
        }
        _ => {}
    }
    info.metadata = doc.metadata;
    info
}

/// Pages `start..=end` of the document; `end` of `None` or negative means
/// the last page
pub fn read_pages(path: &Path, start: i64, end: Option<i64>) -> Result<ReadPagesResponse, DocError> {
    let doc = formats::load(path)?;
    let total = doc.pages.len();
    let range = inclusive_range(start, end, total).ok_or(DocError::PageOutOfRange {
        page: start.max(0) as usize,
        total,
    })?;

    let selected = &doc.pages[range];
    debug!(path = %path.display(), total, read = selected.len(), "pages read");

    Ok(ReadPagesResponse {
        content: selected
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
        pages: selected
            .iter()
            .map(|p| PageDetail {
                page_number: p.number,
                page_name: p.name.clone(),
                line_count: p.lines().len(),
            })
            .collect(),
        total_pages: total,
        read_pages: selected.len(),
        metadata: doc.metadata,
        error_message: None,
    })
}

/// Lines `start..=end` of one page; a missing or negative page index means
/// the first page
pub fn read_lines(
    path: &Path,
    start: i64,
    end: Option<i64>,
    page_index: Option<i64>,
) -> Result<ReadLinesResponse, DocError> {
    let mut doc = formats::load(path)?;
    let index = page_index.unwrap_or(0).max(0) as usize;
    if index >= doc.pages.len() {
        return Err(DocError::PageOutOfRange {
            page: index,
            total: doc.pages.len(),
        });
    }

    let page = doc.pages.swap_remove(index);
    let lines = page.lines();
    let total = lines.len();
    let range = inclusive_range(start, end, total).ok_or(DocError::LineOutOfRange {
        line: start.max(0) as usize,
        total,
    })?;
    let selected = &lines[range];

    Ok(ReadLinesResponse {
        content: selected.join("\n"),
        total_lines: total,
        read_lines: selected.len(),
        page_index: index,
        metadata: doc.metadata,
        error_message: None,
    })
}

/// Read the document within a character budget
///
/// Sizes are counted in characters. A document over budget is cut from
/// the start, or sampled at its start, middle and end in sample mode.
pub fn read_smart(path: &Path, req: &SmartReadRequest) -> Result<SmartReadResponse, DocError> {
    let max_chars = req.effective_max_chars();
    let doc = formats::load(path)?;

    let mut content = doc.content();
    if req.effective_clean() {
        content = clean_text(&content);
    }
    let original_size = content.chars().count();

    let mut resp = SmartReadResponse {
        original_size,
        metadata: doc.metadata,
        ..Default::default()
    };

    if original_size <= max_chars {
        resp.returned_size = original_size;
        resp.content = content;
        resp.strategy = Some(ReadStrategy::Complete);
        return Ok(resp);
    }

    resp.is_truncated = true;
    if req.sample_mode {
        resp.content = sample_content(&content, max_chars);
        resp.strategy = Some(ReadStrategy::UniformSampling);
        resp.suggestion = Some(format!(
            "Document is large ({original_size} characters), key parts have been sampled. \
             Use read_document_by_page or read_document_by_line to read specific parts as needed"
        ));
    } else {
        resp.content = content.chars().take(max_chars).collect();
        resp.strategy = Some(ReadStrategy::TruncateFromStart);
        resp.suggestion = Some(format!(
            "Document is large ({original_size} characters), only the first {max_chars} \
             characters are returned. Use read_document_by_page or read_document_by_line to \
             read the rest as needed"
        ));
    }
    resp.returned_size = resp.content.chars().count();

    debug!(
        path = %path.display(),
        original_size,
        returned_size = resp.returned_size,
        sample = req.sample_mode,
        "document truncated to budget"
    );
    Ok(resp)
}

/// Resolve an inclusive `start..=end` request against `len` items
///
/// Negative starts count as 0; an end that is absent, negative or past the
/// last item means the last item. `None` when `start` is past the end of a
/// non-empty sequence or `end < start`.
pub fn inclusive_range(start: i64, end: Option<i64>, len: usize) -> Option<Range<usize>> {
    let start = start.max(0) as usize;
    if len == 0 {
        return (start == 0).then_some(0..0);
    }
    if start >= len {
        return None;
    }

    let last = match end {
        Some(end) if end >= 0 => (end as usize).min(len - 1),
        _ => len - 1,
    };
    (last >= start).then_some(start..last + 1)
}

/// Collapse runs of whitespace inside lines and drop blank lines
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Start, middle and end of `content`, with section markers, within
/// `max_chars` characters
pub fn sample_content(content: &str, max_chars: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let len = chars.len();
    if len <= max_chars {
        return content.to_string();
    }

    let markers = MIDDLE_MARKER.chars().count() + LATER_MARKER.chars().count();
    let available = max_chars.saturating_sub(markers);
    if available < MIN_SAMPLE_CHARS {
        return chars[..max_chars].iter().collect();
    }

    let part = available / 3;
    let middle_start = len / 2 - part / 2;
    let middle_end = (len / 2 + part / 2).min(len);

    let mut sampled = String::with_capacity(max_chars * 4);
    sampled.extend(&chars[..part]);
    sampled.push_str(MIDDLE_MARKER);
    sampled.extend(&chars[middle_start..middle_end]);
    sampled.push_str(LATER_MARKER);
    sampled.extend(&chars[len - part..]);

    sampled.chars().take(max_chars).collect()
}

/// Human-readable size: `512 B`, `1.50 KB`, `2.00 MB`, `1.00 GB`
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.2} GB", s as f64 / GB as f64),
        s if s >= MB => format!("{:.2} MB", s as f64 / MB as f64),
        s if s >= KB => format!("{:.2} KB", s as f64 / KB as f64),
        s => format!("{s} B"),
    }
}
