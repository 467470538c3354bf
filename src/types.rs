//! Core types and traits for the search SDK

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Represents a web search result returned by any search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// URL of the search result
    pub url: String,
    /// Title of the web page
    pub title: String,
    /// Snippet/description of the web page
    pub snippet: Option<String>,
    /// The source website domain
    pub domain: Option<String>,
    /// When the result was published or last updated
    pub published_date: Option<String>,
    /// The search provider that returned this result
    pub provider: Option<String>,
    /// Raw response data from the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl SearchResult {
    /// Minimal result with only a URL and title set
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: None,
            domain: None,
            published_date: None,
            provider: None,
            raw: None,
        }
    }
}

/// Debug options for the search SDK
#[derive(Debug, Clone, Default)]
pub struct DebugOptions {
    /// Enable verbose logging
    pub enabled: bool,
    /// Log request details (URLs, headers, etc.)
    pub log_requests: bool,
    /// Log full responses
    pub log_responses: bool,
}

/// Safe search setting levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeSearch {
    Off,
    Moderate,
    Strict,
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafeSearch::Off => write!(f, "off"),
            SafeSearch::Moderate => write!(f, "moderate"),
            SafeSearch::Strict => write!(f, "strict"),
        }
    }
}

/// Sort options for search results (primarily for Arxiv)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Relevance => write!(f, "relevance"),
            SortBy::LastUpdatedDate => write!(f, "lastUpdatedDate"),
            SortBy::SubmittedDate => write!(f, "submittedDate"),
        }
    }
}

/// Sort order for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// A normalized query, identical for every provider it is sent to
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// The search query text
    pub query: String,
    /// (Arxiv specific) A comma-delimited list of Arxiv IDs to fetch
    pub id_list: Option<String>,
    /// Maximum number of results to return
    pub max_results: Option<u32>,
    /// Language/locale for results
    pub language: Option<String>,
    /// Country/region for results
    pub region: Option<String>,
    /// Safe search setting
    pub safe_search: Option<SafeSearch>,
    /// Result page number (for pagination)
    pub page: Option<u32>,
    /// (Arxiv specific) The starting index for results (pagination offset)
    pub start: Option<u32>,
    /// (Arxiv specific) Sort order for results
    pub sort_by: Option<SortBy>,
    /// (Arxiv specific) Sort direction
    pub sort_order: Option<SortOrder>,
    /// Overall timeout for the search in milliseconds
    pub timeout: Option<u64>,
    /// Debug options
    pub debug: Option<DebugOptions>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            id_list: None,
            max_results: Some(10),
            language: None,
            region: None,
            safe_search: None,
            page: Some(1),
            start: None,
            sort_by: None,
            sort_order: None,
            timeout: Some(15000), // 15 seconds
            debug: None,
        }
    }
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Reject queries that carry neither text nor an ID list
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() && self.id_list.is_none() {
            return Err(SearchError::InvalidInput(
                "A search query or ID list (for Arxiv) is required".to_string(),
            ));
        }
        Ok(())
    }

    /// The per-call timeout, if one was requested
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }
}

/// Trait that all search provider implementations must satisfy
///
/// Implementations must not run past `deadline`: when they cannot honor it
/// they report [`SearchError::Timeout`] themselves. They must not touch any
/// state shared with the orchestration layer.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync + fmt::Debug {
    /// Name of the search provider, unique within one configuration
    fn name(&self) -> &str;

    /// Run the query, finishing before `deadline`
    async fn search(
        &self,
        options: &SearchOptions,
        deadline: Instant,
    ) -> Result<Vec<SearchResult>, SearchError>;

    /// Get provider configuration (for debugging/logging)
    fn config(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Time left until `deadline`, zero once it has passed
pub fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
