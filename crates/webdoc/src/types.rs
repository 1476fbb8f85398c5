//! Core types for WebDoc

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::DocError;

/// Default character budget of a smart read
pub const DEFAULT_MAX_CHARS: usize = 50_000;

/// Document metadata (title, author, page counts, ...)
pub type Metadata = BTreeMap<String, String>;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Csv,
    Markdown,
    Rtf,
    Docx,
    Pptx,
    Xlsx,
    Pdf,
}

impl DocumentKind {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, DocError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(DocumentKind::Text),
            "csv" => Ok(DocumentKind::Csv),
            "md" => Ok(DocumentKind::Markdown),
            "rtf" => Ok(DocumentKind::Rtf),
            "docx" => Ok(DocumentKind::Docx),
            "pptx" => Ok(DocumentKind::Pptx),
            "xlsx" => Ok(DocumentKind::Xlsx),
            "pdf" => Ok(DocumentKind::Pdf),
            "" => Err(DocError::unsupported("(no extension)")),
            other => Err(DocError::unsupported(format!(".{other}"))),
        }
    }
}

/// One page of extracted text: a PDF page, a slide, a sheet, or the whole
/// file for formats without pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 0-based position in the document
    pub number: usize,
    /// Sheet name, when the format names its pages
    pub name: Option<String>,
    pub text: String,
}

impl Page {
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }
}

/// Extracted document
#[derive(Debug, Clone)]
pub struct Document {
    pub kind: DocumentKind,
    pub pages: Vec<Page>,
    pub metadata: Metadata,
}

impl Document {
    /// Document made of a single unnamed page
    pub fn single(kind: DocumentKind, text: String) -> Self {
        Self {
            kind,
            pages: vec![Page {
                number: 0,
                name: None,
                text,
            }],
            metadata: Metadata::new(),
        }
    }

    /// Build from page texts, numbering them in order
    pub fn paged(kind: DocumentKind, pages: Vec<(Option<String>, String)>) -> Self {
        Self {
            kind,
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(number, (name, text))| Page { number, name, text })
                .collect(),
            metadata: Metadata::new(),
        }
    }

    /// Full text, pages separated by a blank line
    pub fn content(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Request for basic document information
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocumentInfoRequest {
    /// Document file path (supports .docx, .pdf, .xlsx, .pptx, .txt, .csv, .md, .rtf)
    pub file_path: String,
}

/// Basic document information
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocumentInfoResponse {
    /// File path
    #[serde(default)]
    pub file_path: String,

    /// File type (e.g. PDF, DOCX, XLSX)
    #[serde(default)]
    pub file_type: String,

    /// File size (formatted string)
    #[serde(default)]
    pub file_size: String,

    /// Total number of pages (PDF pages, PPTX slides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,

    /// Total number of sheets (XLSX only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sheets: Option<usize>,

    /// Sheet names (XLSX only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheet_names: Vec<String>,

    /// Estimated text size, to judge whether one read will fit
    #[serde(default)]
    pub estimated_size: String,

    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Request to read a range of pages
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadPagesRequest {
    /// Document file path
    pub file_path: String,

    /// Starting page number (0-based, default 0)
    #[serde(default)]
    pub start_page: i64,

    /// Ending page number (inclusive, -1 means to end, default -1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_page: Option<i64>,
}

/// Per-page details of a page read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageDetail {
    /// Page number (0-based)
    pub page_number: usize,

    /// Page name (e.g. sheet name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,

    /// Number of lines in this page
    pub line_count: usize,
}

/// Result of a page read
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadPagesResponse {
    /// Content of the pages read
    #[serde(default)]
    pub content: String,

    /// Page details
    #[serde(default)]
    pub pages: Vec<PageDetail>,

    /// Total number of pages in the document
    #[serde(default)]
    pub total_pages: usize,

    /// Number of pages read
    #[serde(default)]
    pub read_pages: usize,

    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Request to read a range of lines of one page
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadLinesRequest {
    /// Document file path
    pub file_path: String,

    /// Starting line number (0-based, default 0)
    #[serde(default)]
    pub start_line: i64,

    /// Ending line number (inclusive, -1 means to end, default -1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<i64>,

    /// Page index (0-based, for multi-page documents; -1 means first page, default -1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<i64>,
}

/// Result of a line read
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadLinesResponse {
    /// Content of the lines read
    #[serde(default)]
    pub content: String,

    /// Total number of lines in this page
    #[serde(default)]
    pub total_lines: usize,

    /// Number of lines read
    #[serde(default)]
    pub read_lines: usize,

    /// Page index read
    #[serde(default)]
    pub page_index: usize,

    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Request for a read that fits a character budget
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SmartReadRequest {
    /// Document file path
    pub file_path: String,

    /// Maximum character count (default 50000, recommended 10000-100000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,

    /// Sample the start, middle and end instead of reading from the start (default false)
    #[serde(default)]
    pub sample_mode: bool,

    /// Collapse extra spaces and drop blank lines (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_content: Option<bool>,
}

impl SmartReadRequest {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn sample_mode(mut self, sample: bool) -> Self {
        self.sample_mode = sample;
        self
    }

    pub fn clean_content(mut self, clean: bool) -> Self {
        self.clean_content = Some(clean);
        self
    }

    /// Character budget: unset or 0 means 50000
    pub fn effective_max_chars(&self) -> usize {
        match self.max_chars {
            None | Some(0) => DEFAULT_MAX_CHARS,
            Some(n) => n,
        }
    }

    /// Cleaning is on unless explicitly disabled
    pub fn effective_clean(&self) -> bool {
        self.clean_content.unwrap_or(true)
    }
}

/// How a smart read produced its content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ReadStrategy {
    /// Whole document fit in the budget
    #[default]
    #[serde(rename = "Complete read")]
    Complete,
    /// First `max_chars` characters
    #[serde(rename = "Truncate from start")]
    TruncateFromStart,
    /// Start, middle and end sections
    #[serde(rename = "Uniform sampling")]
    UniformSampling,
}

/// Result of a smart read
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SmartReadResponse {
    /// Content read
    #[serde(default)]
    pub content: String,

    /// Whether content was cut to fit the budget
    #[serde(default)]
    pub is_truncated: bool,

    /// Size of the full text, in characters
    #[serde(default)]
    pub original_size: usize,

    /// Size of the returned text, in characters
    #[serde(default)]
    pub returned_size: usize,

    /// Reading strategy used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ReadStrategy>,

    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// How to read the rest of a large document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

macro_rules! error_response {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Response describing a failed read
                pub fn from_error(err: &DocError) -> Self {
                    Self {
                        error_message: Some(err.to_string()),
                        ..Default::default()
                    }
                }

                /// True if this response reports a failure
                pub fn is_error(&self) -> bool {
                    self.error_message.is_some()
                }
            }
        )*
    };
}

error_response!(
    DocumentInfoResponse,
    ReadPagesResponse,
    ReadLinesResponse,
    SmartReadResponse
);
