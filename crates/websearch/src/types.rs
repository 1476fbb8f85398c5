//! Core types for WebSearch

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Maximum query length, in characters
pub const MAX_QUERY_CHARS: usize = 500;

/// Geographical bias applied to results
///
/// Codes follow the `kl` parameter of the search provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Region {
    /// No specific region
    #[default]
    #[serde(rename = "wt-wt", alias = "world")]
    World,
    /// United States
    #[serde(rename = "us-en", alias = "us")]
    UnitedStates,
    /// United Kingdom
    #[serde(rename = "uk-en", alias = "uk")]
    UnitedKingdom,
    /// Germany
    #[serde(rename = "de-de", alias = "de")]
    Germany,
    /// France
    #[serde(rename = "fr-fr", alias = "fr")]
    France,
    /// Japan
    #[serde(rename = "jp-jp", alias = "jp")]
    Japan,
    /// China
    #[serde(rename = "cn-zh", alias = "cn")]
    China,
    /// Russia
    #[serde(rename = "ru-ru", alias = "ru")]
    Russia,
}

impl Region {
    /// All supported regions
    pub const ALL: [Region; 8] = [
        Region::World,
        Region::UnitedStates,
        Region::UnitedKingdom,
        Region::Germany,
        Region::France,
        Region::Japan,
        Region::China,
        Region::Russia,
    ];

    /// Provider region code
    pub fn code(self) -> &'static str {
        match self {
            Region::World => "wt-wt",
            Region::UnitedStates => "us-en",
            Region::UnitedKingdom => "uk-en",
            Region::Germany => "de-de",
            Region::France => "fr-fr",
            Region::Japan => "jp-jp",
            Region::China => "cn-zh",
            Region::Russia => "ru-ru",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            Region::World => "world",
            Region::UnitedStates => "us",
            Region::UnitedKingdom => "uk",
            Region::Germany => "de",
            Region::France => "fr",
            Region::Japan => "jp",
            Region::China => "cn",
            Region::Russia => "ru",
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Region::ALL
            .into_iter()
            .find(|r| r.code() == wanted || r.alias() == wanted)
            .ok_or_else(|| {
                let codes: Vec<&str> = Region::ALL.iter().map(|r| r.code()).collect();
                format!("Invalid region: must be one of {}", codes.join(", "))
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Recency window for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Results from any time
    #[default]
    #[serde(alias = "")]
    Any,
    /// Past day
    #[serde(alias = "d")]
    Day,
    /// Past week
    #[serde(alias = "w")]
    Week,
    /// Past month
    #[serde(alias = "m")]
    Month,
    /// Past year
    #[serde(alias = "y")]
    Year,
}

impl TimeRange {
    /// Provider `df` code; empty for [`TimeRange::Any`]
    pub fn code(self) -> &'static str {
        match self {
            TimeRange::Any => "",
            TimeRange::Day => "d",
            TimeRange::Week => "w",
            TimeRange::Month => "m",
            TimeRange::Year => "y",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" => Ok(TimeRange::Any),
            "d" | "day" => Ok(TimeRange::Day),
            "w" | "week" => Ok(TimeRange::Week),
            "m" | "month" => Ok(TimeRange::Month),
            "y" | "year" => Ok(TimeRange::Year),
            _ => Err("Invalid time range: must be any, day, week, month or year".to_string()),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeRange::Any => "any",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        };
        f.write_str(name)
    }
}

/// Search request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Search keywords (required, at most 500 characters)
    pub query: String,

    /// Time range for results: any (default), day, week, month or year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

impl SearchRequest {
    /// Create a new request with the given query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            time_range: None,
        }
    }

    /// Restrict results to a time range
    pub fn time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Get the effective time range (default to any)
    pub fn effective_time_range(&self) -> TimeRange {
        self.time_range.unwrap_or_default()
    }

    /// Check the query before anything goes on the wire
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery);
        }
        if self.query.chars().count() > MAX_QUERY_CHARS {
            return Err(SearchError::QueryTooLong);
        }
        Ok(())
    }
}

/// A single search result. Identity is the `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    /// Title of the result
    pub title: String,
    /// Web address of the result
    pub url: String,
    /// Snippet shown by the search engine
    pub summary: String,
}

/// Hidden form state echoed back to request the next page
///
/// The field set is whatever the previous page carried; nothing here is
/// interpreted. An empty token means there is no next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationToken {
    fields: BTreeMap<String, String>,
}

impl ContinuationToken {
    /// Create an empty (terminal) token
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// True when no further page is offered
    pub fn is_terminal(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Response from a search
///
/// Either `message` + `results` or `error_message` is populated, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    /// Brief status message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Search results in discovery order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<SearchResult>,

    /// Error information to guide the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SearchResponse {
    /// Successful search, possibly with nothing found
    pub fn found(results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            return Self {
                message: Some(
                    "No results found for your query. Try using different keywords or broader search terms."
                        .to_string(),
                ),
                ..Default::default()
            };
        }

        Self {
            message: Some(format!("Found {} results successfully.", results.len())),
            results,
            error_message: None,
        }
    }

    /// Failed search; carries no results
    pub fn failed(err: &SearchError) -> Self {
        Self {
            error_message: Some(err.user_message()),
            ..Default::default()
        }
    }

    /// True if this response reports a failure
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}
