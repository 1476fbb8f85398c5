//! WebDoc - AI-friendly local document reading
//!
//! Extracts the text of office documents, PDFs and plain-text files and
//! hands it out in pieces a language model can take in: basic info first,
//! then a read that fits a character budget, or explicit page and line
//! ranges.
//!
//! Parsing is blocking work; the [`Tool`] methods move it onto tokio's
//! blocking pool.

mod error;
mod formats;
mod read;
mod tool;
mod types;

pub use error::DocError;
pub use formats::{load as load_document, rtf_to_text};
pub use read::{
    clean_text, document_info, format_file_size, inclusive_range, read_lines, read_pages,
    read_smart, sample_content,
};
pub use tool::{DocOperation, Tool, ToolBuilder};
pub use types::{
    Document, DocumentInfoRequest, DocumentInfoResponse, DocumentKind, Metadata, Page,
    PageDetail, ReadLinesRequest, ReadLinesResponse, ReadPagesRequest, ReadPagesResponse,
    ReadStrategy, SmartReadRequest, SmartReadResponse, DEFAULT_MAX_CHARS,
};

/// `get_document_info` description for LLM consumption
pub const INFO_DESCRIPTION: &str = r#"Get basic information about a document, including file type, size, page count, and metadata. Supported formats: .docx, .pdf, .xlsx, .pptx, .txt, .csv, .md, .rtf.
This is the first step before reading a document, helping you understand document structure and decide how to read it."#;

/// `read_document_smart` description for LLM consumption
pub const SMART_DESCRIPTION: &str = r#"Read document content, automatically handling large documents. Features:
- Fits the context budget (default 50000 characters)
- Sampling mode (start, middle and end) or truncation from start
- Cleans extra spaces and blank lines unless clean_content is false
- Suggests how to continue when the document is too large
Best for: first-time document reading, quick content overview"#;

/// `read_document_by_page` description for LLM consumption
pub const PAGES_DESCRIPTION: &str = r#"Read document content by page range. Pages are PDF pages, PPTX slides and XLSX sheets; other formats are a single page.
Parameters:
- start_page: Starting page (0-based)
- end_page: Ending page, inclusive (-1 means to end)
Returns details for each page (page number, sheet name, line count).
Best for: reading specific pages or sections"#;

/// `read_document_by_line` description for LLM consumption
pub const LINES_DESCRIPTION: &str = r#"Read document content by line range within one page.
Parameters:
- start_line: Starting line (0-based)
- end_line: Ending line, inclusive (-1 means to end)
- page_index: Page index (-1 means first page)
Best for: reading specific lines or paragraphs"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# WebDoc Tools

Read local documents: .docx, .pdf, .xlsx, .pptx, .txt, .csv, .md, .rtf.

## Tools
- `get_document_info`: type, size, page/sheet counts, estimated text size, metadata
- `read_document_smart`: whole text when it fits `max_chars`, otherwise the start
  or (with `sample_mode`) start, middle and end sections
- `read_document_by_page`: inclusive page range
- `read_document_by_line`: inclusive line range of one page

## Pages
- PDF: one page per PDF page
- PPTX: one page per slide
- XLSX: one page per sheet (cells tab separated, rows one per line)
- Everything else: a single page

## Examples

### Inspect first
```json
{"file_path": "/data/report.pdf"}
```

### Read pages 2 to 4
```json
{"file_path": "/data/report.pdf", "start_page": 2, "end_page": 4}
```

### Sample a large document
```json
{"file_path": "/data/log.txt", "max_chars": 20000, "sample_mode": true}
```

## Error Handling
- Unsupported extensions and unreadable files are reported in `error_message`
- Page or line ranges starting past the end are errors; ends past the end are clamped
- When the server restricts directories, paths outside them are refused
"#;
