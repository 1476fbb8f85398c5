//! Core types for WebFetch

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FetchError;

/// Default request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the request timeout, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Output format of the fetched content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// Plain text; HTML is reduced to its visible text
    #[default]
    Text,
    /// Markdown; HTML is converted, other content is fenced
    Markdown,
    /// HTML body
    Html,
    /// Body as-is
    Json,
}

impl FromStr for ContentFormat {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "text" => Ok(ContentFormat::Text),
            "markdown" => Ok(ContentFormat::Markdown),
            "html" => Ok(ContentFormat::Html),
            "json" => Ok(ContentFormat::Json),
            _ => Err(FetchError::InvalidFormat),
        }
    }
}

impl std::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentFormat::Text => write!(f, "text"),
            ContentFormat::Markdown => write!(f, "markdown"),
            ContentFormat::Html => write!(f, "html"),
            ContentFormat::Json => write!(f, "json"),
        }
    }
}

/// Request to fetch a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchRequest {
    /// URL address to fetch content from (must start with http:// or https://)
    pub url: String,

    /// Format of returned content (text/markdown/html/json), default text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Request timeout in seconds, default 30 seconds, maximum 120 seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl WebFetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the output format
    pub fn format(mut self, format: ContentFormat) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Set the timeout in seconds
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    /// Get the effective format (default to text)
    pub fn effective_format(&self) -> Result<ContentFormat, FetchError> {
        match self.format.as_deref() {
            None => Ok(ContentFormat::default()),
            Some(s) => s.parse(),
        }
    }

    /// Get the effective timeout: 0 or unset means 30s, capped at 120s
    pub fn effective_timeout_secs(&self) -> u64 {
        match self.timeout {
            None | Some(0) => DEFAULT_TIMEOUT_SECS,
            Some(secs) => secs.min(MAX_TIMEOUT_SECS),
        }
    }
}

/// Response from a fetch operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchResponse {
    /// Response content, processed according to the requested format
    pub content: String,

    /// HTTP status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Original content type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Whether content was truncated at the size limit
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_truncated: bool,

    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl WebFetchResponse {
    /// Response describing a failed fetch
    pub fn from_error(err: &FetchError) -> Self {
        Self {
            status_code: err.status_code(),
            error_message: Some(err.to_string()),
            ..Default::default()
        }
    }

    /// True if this response reports a failure
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_format_from_str() {
        assert_eq!(ContentFormat::from_str("text").unwrap(), ContentFormat::Text);
        assert_eq!(ContentFormat::from_str("").unwrap(), ContentFormat::Text);
        assert_eq!(
            ContentFormat::from_str("Markdown").unwrap(),
            ContentFormat::Markdown
        );
        assert_eq!(ContentFormat::from_str("HTML").unwrap(), ContentFormat::Html);
        assert_eq!(ContentFormat::from_str("json").unwrap(), ContentFormat::Json);
        assert!(matches!(
            ContentFormat::from_str("pdf"),
            Err(FetchError::InvalidFormat)
        ));
    }

    #[test]
    fn test_content_format_display() {
        assert_eq!(ContentFormat::Text.to_string(), "text");
        assert_eq!(ContentFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_request_builder() {
        let req = WebFetchRequest::new("https://example.com")
            .format(ContentFormat::Markdown)
            .timeout(10);

        assert_eq!(req.url, "https://example.com");
        assert_eq!(req.effective_format().unwrap(), ContentFormat::Markdown);
        assert_eq!(req.effective_timeout_secs(), 10);
    }

    #[test]
    fn test_effective_timeout() {
        let req = WebFetchRequest::new("https://example.com");
        assert_eq!(req.effective_timeout_secs(), 30);
        assert_eq!(req.clone().timeout(0).effective_timeout_secs(), 30);
        assert_eq!(req.clone().timeout(500).effective_timeout_secs(), 120);
    }

    #[test]
    fn test_request_serialization() {
        let req = WebFetchRequest::new("https://example.com").format(ContentFormat::Html);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"url\":\"https://example.com\""));
        assert!(json.contains("\"format\":\"html\""));
        assert!(!json.contains("timeout"));
    }

    #[test]
    fn test_response_serialization() {
        let resp = WebFetchResponse {
            content: "Hello".to_string(),
            status_code: Some(200),
            ..Default::default()
        };
        let json = serde_json::to_string(&resp).unwrap();
        // Optional None fields should be omitted
        assert!(!json.contains("content_type"));
        assert!(!json.contains("is_truncated"));
        assert!(json.contains("\"content\":\"Hello\""));
    }

    #[test]
    fn test_response_from_error() {
        let resp = WebFetchResponse::from_error(&FetchError::HttpStatus(404));
        assert_eq!(resp.status_code, Some(404));
        assert!(resp.is_error());
        assert!(resp.content.is_empty());
    }
}
