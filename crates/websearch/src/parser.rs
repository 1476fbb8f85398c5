//! Result page parsing
//!
//! Turns one page of search markup into result records and the hidden
//! form state needed to request the page after it.

use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use std::collections::HashSet;

use crate::error::SearchError;
use crate::types::{ContinuationToken, SearchResult};

/// Links that wrap another search or a sponsored result
const SKIPPED_LINK_PREFIXES: &[&str] = &[
    "http://www.google.com/search?q=",
    "https://duckduckgo.com/y.js?ad_domain",
];

/// One parsed result page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Results in page order, deduplicated within the page
    pub results: Vec<SearchResult>,
    /// State for the next page; terminal when no next page is offered
    pub next: ContinuationToken,
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css)
        .map_err(|e| SearchError::ResponseFormat(format!("invalid selector {css:?}: {e}")))
}

/// Collapse whitespace runs in an element's text
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_skipped_link(href: &str) -> bool {
    SKIPPED_LINK_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

/// Parse a result page.
///
/// Entries without a title link, a title, or a snippet are skipped, as
/// are redirect and ad links. A page with no usable entries is not an
/// error. Duplicate URLs are only removed within this page.
pub fn parse_page(markup: &str) -> Result<ParsedPage, SearchError> {
    let entry_sel = selector("div#links div.web-result")?;
    let title_sel = selector("h2.result__title > a")?;
    let snippet_sel = selector("a.result__snippet")?;
    let nav_sel = selector("div.nav-link")?;
    let form_sel = selector("form")?;
    let hidden_sel = selector("input[type=hidden]")?;

    let doc = Html::parse_document(markup);

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for entry in doc.select(&entry_sel) {
        let Some(link) = entry.select(&title_sel).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() || is_skipped_link(href) || seen.contains(href) {
            continue;
        }

        let Some(snippet) = entry.select(&snippet_sel).next() else {
            continue;
        };
        let summary = element_text(snippet);
        let title = element_text(link);
        if summary.is_empty() || title.is_empty() {
            continue;
        }

        seen.insert(href.to_string());
        results.push(SearchResult {
            title,
            url: href.to_string(),
            summary,
        });
    }

    let mut next = ContinuationToken::new();
    if doc.select(&nav_sel).next().is_some() {
        if let Some(form) = doc.select(&form_sel).last() {
            for input in form.select(&hidden_sel) {
                let attrs = input.value();
                if let (Some(name), Some(value)) = (attrs.attr("name"), attrs.attr("value")) {
                    next.insert(name, value);
                }
            }
        }
    }

    tracing::debug!(
        results = results.len(),
        has_next = !next.is_terminal(),
        "Parsed result page"
    );

    Ok(ParsedPage { results, next })
}

/// Decode a raw response body into markup
///
/// Invalid UTF-8 sequences become U+FFFD; the rest of the page stays
/// readable.
pub fn decode_body(body: &[u8]) -> Cow<'_, str> {
    let markup = String::from_utf8_lossy(body);
    if let Cow::Owned(_) = markup {
        tracing::debug!(bytes = body.len(), "Result page contained invalid UTF-8");
    }
    markup
}
