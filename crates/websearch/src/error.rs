//! Error types for WebSearch
//!
//! Every failure a search can run into maps onto one [`SearchError`]
//! variant. None of them is retried internally; the variant only decides
//! the message handed back to the caller.

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::MAX_QUERY_CHARS;

/// Errors that can occur during a search
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query text is empty
    #[error("search query is required, please provide a query string")]
    InvalidQuery,

    /// Query text exceeds the length limit
    #[error(
        "search query is too long (max {} characters), please shorten your query",
        MAX_QUERY_CHARS
    )]
    QueryTooLong,

    /// Connection, DNS, timeout or body read failure
    #[error("network error, please check your connection: {0}")]
    Network(String),

    /// Upstream answered 429
    #[error("rate limit exceeded (status 429), please wait a moment and try again")]
    RateLimited,

    /// Upstream answered 403
    #[error("access forbidden (status 403), the search service may be blocking requests")]
    Blocked,

    /// Upstream answered any other non-2xx status
    #[error("search service returned status {0}, please try again later")]
    Upstream(u16),

    /// Result page could not be traversed
    #[error("failed to parse search results: {0}")]
    ResponseFormat(String),

    /// Invocation was cancelled before it finished
    #[error("search was cancelled")]
    Cancelled,

    /// Failed to build HTTP client
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl SearchError {
    /// Classify a transport-level failure.
    ///
    /// Covers both sending the request and reading its body: connect,
    /// DNS and timeout failures all surface as [`SearchError::Network`].
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "failed to connect to search service".to_string()
        } else {
            err.to_string()
        };
        SearchError::Network(detail)
    }

    /// Classify a response status. Returns `None` for 2xx.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            s if s.is_success() => None,
            StatusCode::TOO_MANY_REQUESTS => Some(SearchError::RateLimited),
            StatusCode::FORBIDDEN => Some(SearchError::Blocked),
            s => Some(SearchError::Upstream(s.as_u16())),
        }
    }

    /// True for failures detected before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::InvalidQuery | SearchError::QueryTooLong)
    }

    /// Message surfaced in the `error_message` field of a search response
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            format!("search request failed: {self}. Please try again or rephrase your query")
        }
    }
}
