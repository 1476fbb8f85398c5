//! WebSearch - AI-friendly web search library
//!
//! Searches the web through the DuckDuckGo HTML interface. There is no
//! API behind it, so a search drives the same form a browser would:
//! post the query, scrape the result page, follow the "next page" form,
//! and stop once enough results are collected or the pages run out.
//!
//! Every outcome, including transport and parse failures, comes back as a
//! [`SearchResponse`]; a search never returns a raw error.

mod client;
mod config;
mod error;
mod parser;
mod request;
mod tool;
mod types;

pub use client::SearchClient;
pub use config::{SessionConfig, DEFAULT_MAX_RESULTS, DEFAULT_TIMEOUT, PAGE_DELAY};
pub use error::SearchError;
pub use parser::{parse_page, ParsedPage};
pub use request::{
    build_continuation, build_headers, build_initial, RequestBody, SEARCH_URL, USER_AGENTS,
};
pub use tool::{Tool, ToolBuilder};
pub use types::{
    ContinuationToken, Region, SearchRequest, SearchResponse, SearchResult, TimeRange,
    MAX_QUERY_CHARS,
};

/// Re-exported so callers can cancel a running search
pub use tokio_util::sync::CancellationToken;

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Search for information using DuckDuckGo search engine.

## When to Use
Use this tool when you need to:
- Search for the latest information on the internet
- Find materials on specific topics
- Get search results within a specified time range

## Usage Tips
- Provide clear, specific search keywords for better results
- You can use the time_range parameter to limit search results to a specific time period"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# WebSearch Tool

Searches the web with DuckDuckGo and returns titles, URLs and snippets.

## Capabilities
- Keyword search with optional recency filter
- Region bias configured per session
- Follows result pages until enough results are collected

## Input Parameters
- `query` (required): Search keywords, at most 500 characters
- `time_range` (optional): `any` (default), `day`, `week`, `month`, `year`
  (short codes `d`, `w`, `m`, `y` are accepted too)

## Output Fields
- `message`: Status message on success
- `results`: List of `{title, url, summary}` in result order
- `error_message`: Error description on failure (no results are returned then)

## Examples

### Search
```json
{"query": "rust async runtime"}
```

### Search the past week
```json
{"query": "rust release notes", "time_range": "week"}
```

## Error Handling
- Empty or overlong queries are rejected before any request is made
- Rate limiting (429) and blocking (403) are reported, not retried
- A failure on any result page discards results from earlier pages
- Finding nothing is not an error: a "No results found" message is returned
"#;
