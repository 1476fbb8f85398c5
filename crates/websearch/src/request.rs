//! Outgoing request construction
//!
//! The HTML interface is a plain browser form, so requests are built to
//! look like a browser navigating within the site: a form-encoded POST with
//! same-origin navigation headers and a user agent from a fixed pool.

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, REFERER, USER_AGENT};
use std::collections::BTreeMap;

use crate::types::{ContinuationToken, Region, SearchRequest};

/// Search form endpoint
pub const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// Referer sent with every request
const SEARCH_REFERER: &str = "https://html.duckduckgo.com/";

/// Desktop browser user agents rotated across requests
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Form-encoded request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBody {
    fields: BTreeMap<String, String>,
}

impl RequestBody {
    /// Look up a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the body has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as `application/x-www-form-urlencoded`
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

/// Body for the first page of a query
///
/// `b` is the (empty) pagination offset; `kl` stays empty for the world
/// region and `df` stays empty for any time.
pub fn build_initial(request: &SearchRequest, region: Region) -> RequestBody {
    let kl = if region == Region::World {
        ""
    } else {
        region.code()
    };

    let fields = [
        ("q", request.query.as_str()),
        ("b", ""),
        ("kl", kl),
        ("df", request.effective_time_range().code()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    RequestBody { fields }
}

/// Body for a follow-up page: the token's fields, verbatim
pub fn build_continuation(token: &ContinuationToken) -> RequestBody {
    let fields = token
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    RequestBody { fields }
}

/// Pick a user agent from [`USER_AGENTS`]
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Header set for every search request
pub fn build_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static(SEARCH_REFERER));
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
    headers
}
