//! WebFetch - AI-friendly web content fetching library
//!
//! Fetches a URL and shapes the body into text, markdown, HTML or raw
//! JSON for consumption by a language model.

mod client;
mod convert;
mod error;
mod tool;
mod types;

pub use client::{fetch, fetch_with_options, process_content, FetchOptions, MAX_RESPONSE_SIZE};
pub use convert::{extract_html_body, html_to_markdown, html_to_text, is_html};
pub use error::FetchError;
pub use tool::{Tool, ToolBuilder};
pub use types::{
    ContentFormat, WebFetchRequest, WebFetchResponse, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns WebTools/1.0";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Fetch web resource content from URL and return content in specified format.

## When to Use
Use this tool when you need to:
- Get raw content from a web page
- Access API endpoints to get JSON data
- Download HTML/text/Markdown content

Don't use this tool when you need to:
- Extract specific information from a web page (fetch first, then extract)
- Analyze or summarize web page content (fetch first, then analyze)

## Usage Tips
- text: plain text extracted from HTML
- markdown: HTML converted to Markdown
- html: the HTML document body
- json: JSON returned by API endpoints, unchanged
- Timeout defaults to 30 seconds, maximum 120 seconds
- Responses larger than 5MB are truncated"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# WebFetch Tool

Fetches content from a URL and returns it as text, markdown, HTML or JSON.

## Capabilities
- HTTP GET with redirects
- HTML to plain text and Markdown conversion
- Response size limit (5MB), reported with `is_truncated`

## Input Parameters
- `url` (required): The URL to fetch (must be http:// or https://)
- `format` (optional): `text` (default), `markdown`, `html`, `json`
- `timeout` (optional): Seconds, default 30, maximum 120

## Output Fields
- `content`: The fetched content, processed according to `format`
- `status_code`: HTTP status code
- `content_type`: Content-Type header value
- `is_truncated`: True if the body exceeded the size limit
- `error_message`: Error description on failure

## Examples

### Fetch a webpage as markdown
```json
{"url": "https://example.com", "format": "markdown"}
```

### Fetch API data
```json
{"url": "https://api.example.com/data.json", "format": "json", "timeout": 10}
```

## Error Handling
- Invalid URLs and unknown formats are rejected before any request
- Any status other than 200 is reported as an error with `status_code`
- Non-UTF-8 bodies are rejected
- Non-HTML content requested as markdown is wrapped in a code block
"#;
