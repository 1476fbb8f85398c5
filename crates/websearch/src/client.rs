//! Search client and pagination driver
//!
//! A search is a conversation: the first page is requested with the
//! query, and every following page is requested by echoing back the
//! hidden form state of the page before it. Pages are fetched strictly
//! one after another with a pause in between.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::SearchError;
use crate::parser::{decode_body, parse_page, ParsedPage};
use crate::request::{build_continuation, build_headers, build_initial, RequestBody};
use crate::types::{Region, SearchRequest, SearchResponse, SearchResult};

/// Where the pagination loop stands
#[derive(Debug)]
enum State {
    /// Query not yet validated
    Init,
    /// Next request to send
    Requesting(RequestBody),
    /// Last page received
    Parsed(ParsedPage),
    /// Accumulated results are final
    Done,
}

/// Reusable search session
///
/// Holds the HTTP connection pool and the session settings. Cloning is
/// cheap and clones share the pool; each search owns its own state.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    region: Region,
    max_results: usize,
    page_delay: Duration,
}

impl SearchClient {
    /// Create a session from its configuration
    pub fn new(config: SessionConfig) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder().timeout(config.effective_timeout());

        if let Some(proxy) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| SearchError::ClientBuild(format!("invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| SearchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            max_results: config.effective_max_results(),
            endpoint: config.endpoint,
            region: config.region,
            page_delay: config.page_delay,
        })
    }

    /// Session with default settings
    pub fn with_defaults() -> Result<Self, SearchError> {
        Self::new(SessionConfig::default())
    }

    /// Region this session searches in
    pub fn region(&self) -> Region {
        self.region
    }

    /// Result limit of this session
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run a search. Never fails; errors are reported in the response.
    pub async fn search(&self, request: SearchRequest) -> SearchResponse {
        self.search_cancellable(request, &CancellationToken::new())
            .await
    }

    /// Run a search that stops as soon as `cancel` fires
    ///
    /// Cancellation is observed while a request is in flight and during
    /// the pause between pages.
    pub async fn search_cancellable(
        &self,
        request: SearchRequest,
        cancel: &CancellationToken,
    ) -> SearchResponse {
        match self.run(&request, cancel).await {
            Ok(results) => {
                info!(results = results.len(), "Search completed");
                SearchResponse::found(results)
            }
            Err(err) => {
                if err.is_validation() {
                    debug!(error = %err, "Rejected search query");
                } else {
                    warn!(error = %err, "Search failed");
                }
                SearchResponse::failed(&err)
            }
        }
    }

    /// Drive the pagination state machine.
    ///
    /// Any error on any page aborts the whole search and drops what was
    /// collected so far.
    async fn run(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut results: Vec<SearchResult> = Vec::with_capacity(self.max_results);
        let mut page = 0usize;
        let mut state = State::Init;

        loop {
            state = match state {
                State::Init => {
                    request.validate()?;
                    State::Requesting(build_initial(request, self.region))
                }
                State::Requesting(body) => {
                    page += 1;
                    debug!(page, fields = body.len(), "Requesting result page");
                    let markup = self.fetch_page(&body, cancel).await?;
                    State::Parsed(parse_page(&markup)?)
                }
                State::Parsed(ParsedPage { results: found, next }) => {
                    if found.is_empty() {
                        debug!(page, "Page had no results");
                        State::Done
                    } else {
                        results.extend(found);
                        if results.len() >= self.max_results {
                            results.truncate(self.max_results);
                            State::Done
                        } else if next.is_terminal() {
                            State::Done
                        } else {
                            self.pause(cancel).await?;
                            State::Requesting(build_continuation(&next))
                        }
                    }
                }
                State::Done => return Ok(results),
            };
        }
    }

    /// Send one page request and return the page markup
    async fn fetch_page(
        &self,
        body: &RequestBody,
        cancel: &CancellationToken,
    ) -> Result<String, SearchError> {
        let send = async {
            let response = self
                .http
                .post(&self.endpoint)
                .headers(build_headers())
                .body(body.encode())
                .send()
                .await
                .map_err(|e| SearchError::from_reqwest(&e))?;

            let status = response.status();
            if let Some(err) = SearchError::from_status(status) {
                return Err(err);
            }
            debug!(status = status.as_u16(), "Received result page");

            let bytes = response
                .bytes()
                .await
                .map_err(|e| SearchError::from_reqwest(&e))?;
            Ok(decode_body(&bytes).into_owned())
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            result = send => result,
        }
    }

    /// Wait out the page delay unless cancelled first
    async fn pause(&self, cancel: &CancellationToken) -> Result<(), SearchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            _ = tokio::time::sleep(self.page_delay) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_config() {
        let client = SearchClient::new(SessionConfig::new().max_results(0)).unwrap();
        assert_eq!(client.max_results(), 10);
        assert_eq!(client.region(), Region::World);
    }

    #[test]
    fn test_new_rejects_bad_proxy() {
        let result = SearchClient::new(SessionConfig::new().proxy("http://[::1"));
        assert!(matches!(result, Err(SearchError::ClientBuild(_))));
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        // Unroutable endpoint: reaching the network would fail differently
        let client = SearchClient::new(SessionConfig::new().endpoint("http://127.0.0.1:9/html/"))
            .unwrap();

        let resp = client.search(SearchRequest::new("")).await;
        assert!(resp.results.is_empty());
        assert!(resp.error_message.unwrap().contains("query is required"));
    }

    #[tokio::test]
    async fn test_long_query_sends_nothing() {
        let client = SearchClient::new(SessionConfig::new().endpoint("http://127.0.0.1:9/html/"))
            .unwrap();

        let resp = client.search(SearchRequest::new("a".repeat(501))).await;
        assert!(resp.results.is_empty());
        assert!(resp.error_message.unwrap().contains("too long"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let client = SearchClient::new(SessionConfig::new().endpoint("http://127.0.0.1:9/html/"))
            .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let resp = client
            .search_cancellable(SearchRequest::new("rust"), &cancel)
            .await;
        assert!(resp.error_message.unwrap().contains("cancelled"));
    }
}
