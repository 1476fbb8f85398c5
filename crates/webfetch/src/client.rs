//! HTTP client for WebFetch

use crate::convert::{extract_html_body, fence, html_to_markdown, html_to_text, is_html};
use crate::error::FetchError;
use crate::types::{ContentFormat, WebFetchRequest, WebFetchResponse};
use crate::DEFAULT_USER_AGENT;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of body bytes kept from a response (5 MiB)
pub const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

/// Fetch options that can be configured via tool builder
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
    /// Proxy URL applied to every request
    pub proxy: Option<String>,
}

/// Fetch a URL and return the response
pub async fn fetch(req: WebFetchRequest) -> Result<WebFetchResponse, FetchError> {
    fetch_with_options(req, &FetchOptions::default()).await
}

/// Fetch a URL with custom options
pub async fn fetch_with_options(
    req: WebFetchRequest,
    options: &FetchOptions,
) -> Result<WebFetchResponse, FetchError> {
    check_url(&req.url, options)?;
    let format = req.effective_format()?;
    let timeout = Duration::from_secs(req.effective_timeout_secs());

    let mut headers = HeaderMap::new();
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(ACCEPT, HeaderValue::from_static(accept_for(format)));

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);
    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| FetchError::ClientBuildError(e.to_string()))?;
        builder = builder.proxy(proxy);
    }
    let client = builder
        .build()
        .map_err(|e| FetchError::ClientBuildError(e.to_string()))?;

    debug!(url = %req.url, %format, timeout_secs = timeout.as_secs(), "fetching URL");

    let response = client
        .get(&req.url)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if status != StatusCode::OK {
        warn!(url = %req.url, status = status.as_u16(), "fetch returned non-OK status");
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let (body, is_truncated) = read_capped(response, MAX_RESPONSE_SIZE).await?;
    let text = decode_utf8(&body, is_truncated)?;
    let content = process_content(text, content_type.as_deref(), format);

    debug!(
        url = %req.url,
        bytes = body.len(),
        is_truncated,
        "fetch completed"
    );

    Ok(WebFetchResponse {
        content,
        status_code: Some(status.as_u16()),
        content_type,
        is_truncated,
        error_message: None,
    })
}

/// Validate the URL and apply the allow/block prefix lists
fn check_url(url: &str, options: &FetchOptions) -> Result<(), FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::MissingUrl);
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(FetchError::InvalidUrlScheme);
    }

    if !options.allow_prefixes.is_empty()
        && !options
            .allow_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    if options
        .block_prefixes
        .iter()
        .any(|prefix| url.starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    Ok(())
}

fn accept_for(format: ContentFormat) -> &'static str {
    match format {
        ContentFormat::Json => "application/json, */*;q=0.8",
        ContentFormat::Html => "text/html, */*;q=0.8",
        ContentFormat::Text | ContentFormat::Markdown => {
            "text/html, text/plain, text/markdown, */*;q=0.8"
        }
    }
}

/// Read at most `limit` bytes of the body
///
/// The flag is set when the body had more bytes than the limit.
async fn read_capped(
    response: reqwest::Response,
    limit: usize,
) -> Result<(Vec<u8>, bool), FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::BodyError(e.to_string()))?;
        let room = limit - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            warn!(limit, "response body exceeds size limit, truncating");
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((body, false))
}

/// Decode the body as UTF-8
///
/// A truncated body may end inside a multi-byte character; that tail is
/// dropped instead of failing the whole fetch.
fn decode_utf8(body: &[u8], truncated: bool) -> Result<&str, FetchError> {
    match std::str::from_utf8(body) {
        Ok(text) => Ok(text),
        Err(e) if truncated && e.error_len().is_none() => {
            std::str::from_utf8(&body[..e.valid_up_to()]).map_err(|_| FetchError::InvalidUtf8)
        }
        Err(_) => Err(FetchError::InvalidUtf8),
    }
}

/// Shape the decoded body according to the requested format
pub fn process_content(body: &str, content_type: Option<&str>, format: ContentFormat) -> String {
    let html = is_html(content_type, body);
    match format {
        ContentFormat::Text if html => html_to_text(body),
        ContentFormat::Text => body.to_string(),
        ContentFormat::Markdown if html => html_to_markdown(body),
        ContentFormat::Markdown => fence(body),
        ContentFormat::Html if html => extract_html_body(body),
        ContentFormat::Html | ContentFormat::Json => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_url_validation() {
        let options = FetchOptions::default();
        assert!(matches!(check_url("", &options), Err(FetchError::MissingUrl)));
        assert!(matches!(
            check_url("ftp://example.com", &options),
            Err(FetchError::InvalidUrlScheme)
        ));
        assert!(check_url("https://example.com", &options).is_ok());
        assert!(check_url("http://example.com", &options).is_ok());
    }

    #[test]
    fn test_check_url_prefix_lists() {
        let options = FetchOptions {
            allow_prefixes: vec!["https://docs.".to_string()],
            block_prefixes: vec!["https://docs.internal".to_string()],
            ..Default::default()
        };
        assert!(check_url("https://docs.rs/serde", &options).is_ok());
        assert!(matches!(
            check_url("https://example.com", &options),
            Err(FetchError::BlockedUrl)
        ));
        assert!(matches!(
            check_url("https://docs.internal/secret", &options),
            Err(FetchError::BlockedUrl)
        ));
    }

    #[test]
    fn test_decode_utf8_truncated_tail() {
        // "é" is two bytes; cut after the first one
        let body = "caf\u{e9}".as_bytes();
        let cut = &body[..body.len() - 1];
        assert_eq!(decode_utf8(cut, true).unwrap(), "caf");
        assert!(matches!(decode_utf8(cut, false), Err(FetchError::InvalidUtf8)));
        assert!(matches!(
            decode_utf8(&[0xff, 0xfe, b'a'], true),
            Err(FetchError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_process_content_by_format() {
        let html = "<html><body><h1>Title</h1><p>Body</p></body></html>";
        let ct = Some("text/html");

        assert_eq!(process_content(html, ct, ContentFormat::Text), "Title\nBody");
        assert_eq!(
            process_content(html, ct, ContentFormat::Markdown),
            "# Title\n\nBody"
        );
        assert_eq!(
            process_content(html, ct, ContentFormat::Html),
            "<html>\n<body>\n<h1>Title</h1><p>Body</p>\n</body>\n</html>"
        );
        assert_eq!(process_content(html, ct, ContentFormat::Json), html);
    }

    #[test]
    fn test_process_content_non_html() {
        let plain = "just text";
        let ct = Some("text/plain");
        assert_eq!(process_content(plain, ct, ContentFormat::Text), plain);
        assert_eq!(
            process_content(plain, ct, ContentFormat::Markdown),
            "```\njust text\n```"
        );
        assert_eq!(process_content(plain, ct, ContentFormat::Html), plain);
    }
}
