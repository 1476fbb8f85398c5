//! Session configuration

use std::time::Duration;

use crate::request::SEARCH_URL;
use crate::types::Region;

/// Default number of results returned per search
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Wait between page requests; faster paging gets answered with empty pages
pub const PAGE_DELAY: Duration = Duration::from_secs(3);

/// Settings fixed for the lifetime of a [`SearchClient`](crate::SearchClient)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Region bias for results
    pub region: Region,
    /// Upper bound on results per search (0 means the default)
    pub max_results: usize,
    /// Timeout applied to each request, not to the whole search
    pub timeout: Duration,
    /// Proxy URL for all requests; system proxy settings apply when unset
    pub proxy: Option<String>,
    /// Search form endpoint
    pub endpoint: String,
    /// Pause between consecutive page requests
    pub page_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            region: Region::World,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            endpoint: SEARCH_URL.to_string(),
            page_delay: PAGE_DELAY,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set the maximum number of results
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route requests through a proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Point the session at another endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the pause between page requests
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Max results with 0 replaced by the default
    pub fn effective_max_results(&self) -> usize {
        if self.max_results == 0 {
            DEFAULT_MAX_RESULTS
        } else {
            self.max_results
        }
    }

    /// Timeout with zero replaced by the default
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}
