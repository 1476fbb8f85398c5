//! Error types for WebFetch

use thiserror::Error;

/// Errors that can occur during fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("URL is required")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("URL must start with http:// or https://")]
    InvalidUrlScheme,

    /// Unknown output format
    #[error("format must be one of: text, markdown, html, json")]
    InvalidFormat,

    /// URL is blocked by prefix list
    #[error("blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("failed to create HTTP client: {0}")]
    ClientBuildError(String),

    /// Request timed out
    #[error("failed to fetch URL: request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("failed to fetch URL: could not connect to server")]
    ConnectError,

    /// Other request error
    #[error("failed to fetch URL: {0}")]
    RequestError(String),

    /// Server answered with a status other than 200
    #[error("request failed with status code: {0}")]
    HttpStatus(u16),

    /// Body could not be read
    #[error("failed to read response body: {0}")]
    BodyError(String),

    /// Body is not UTF-8
    #[error("response content is not valid UTF-8")]
    InvalidUtf8,
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}
