//! ArXiv API provider for searching academic papers

use crate::{
    error::{SearchError, SearchResult},
    types::{SearchOptions, SearchProvider, SearchResult as SearchResultType},
    utils::{debug, http},
};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::time::Instant;

const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
/// Largest page the provider requests in one call
const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
struct ArxivFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<ArxivEntry>,
}

#[derive(Debug, Deserialize)]
struct ArxivEntry {
    id: String,
    #[serde(default)]
    title: String,
    summary: Option<String>,
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<ArxivAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<ArxivLink>,
}

#[derive(Debug, Deserialize)]
struct ArxivAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ArxivLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@type")]
    link_type: Option<String>,
}

#[derive(Debug)]
pub struct ArxivProvider {
    base_url: String,
    http_client: http::HttpClient,
}

impl ArxivProvider {
    pub fn new() -> Self {
        Self {
            base_url: ARXIV_API_URL.to_string(),
            http_client: http::HttpClient::new(),
        }
    }

    /// Set custom base URL (for testing or mirrors)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    fn query_url(&self, options: &SearchOptions) -> SearchResult<String> {
        let mut params = Vec::new();

        if let Some(id_list) = &options.id_list {
            params.push(("id_list", id_list.clone()));
        } else if !options.query.trim().is_empty() {
            params.push(("search_query", format!("all:{}", options.query.trim())));
        } else {
            return Err(SearchError::InvalidInput(
                "ArXiv search requires either a search query or ID list".to_string(),
            ));
        }

        if let Some(start) = options.start {
            params.push(("start", start.to_string()));
        }

        let max_results = options.max_results.unwrap_or(10).min(MAX_PAGE_SIZE);
        params.push(("max_results", max_results.to_string()));

        if let Some(sort_by) = options.sort_by {
            params.push(("sortBy", sort_by.to_string()));
        }
        if let Some(sort_order) = options.sort_order {
            params.push(("sortOrder", sort_order.to_string()));
        }

        http::build_url(&self.base_url, &params)
    }
}

impl Default for ArxivProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for ArxivProvider {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search(
        &self,
        options: &SearchOptions,
        deadline: Instant,
    ) -> SearchResult<Vec<SearchResultType>> {
        let url = self.query_url(options)?;
        debug::log_request(&options.debug, "ArXiv API request", &url);

        let xml_text = self
            .http_client
            .get_text(&url, &HashMap::new(), deadline)
            .await?;

        debug::log_response(
            &options.debug,
            &format!("ArXiv API response received ({} bytes)", xml_text.len()),
        );

        parse_feed(&xml_text)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.base_url.clone());
        config.insert("max_results".to_string(), MAX_PAGE_SIZE.to_string());
        config
    }
}

/// Convert an Atom feed from the ArXiv API into results
fn parse_feed(xml: &str) -> SearchResult<Vec<SearchResultType>> {
    let feed: ArxivFeed = quick_xml::de::from_str(xml)?;

    let mut results = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        // ArXiv reports bad queries as a single entry under /api/errors
        if entry.id.contains("/api/errors") {
            return Err(SearchError::InvalidInput(format!(
                "ArXiv rejected the query: {}",
                entry.summary.as_deref().map(str::trim).unwrap_or("unknown error")
            )));
        }
        results.push(into_result(entry));
    }

    Ok(results)
}

fn into_result(entry: ArxivEntry) -> SearchResultType {
    let arxiv_id = entry
        .id
        .rsplit("/abs/")
        .next()
        .unwrap_or(&entry.id)
        .to_string();

    let url = entry
        .links
        .iter()
        .find(|link| link.link_type.as_deref() == Some("text/html"))
        .map(|link| link.href.clone())
        .unwrap_or_else(|| format!("https://arxiv.org/abs/{arxiv_id}"));

    let authors = entry
        .authors
        .iter()
        .map(|author| author.name.trim())
        .collect::<Vec<_>>()
        .join(", ");

    let mut raw = serde_json::json!({ "arxiv_id": arxiv_id });
    if !authors.is_empty() {
        raw["authors"] = serde_json::Value::String(authors);
    }
    if let Some(pdf) = entry
        .links
        .iter()
        .find(|link| link.link_type.as_deref() == Some("application/pdf"))
    {
        raw["pdf_url"] = serde_json::Value::String(pdf.href.clone());
    }

    SearchResultType {
        url,
        title: http::normalize_text(&entry.title),
        snippet: entry.summary.map(|s| http::normalize_text(&s)),
        domain: Some("arxiv.org".to_string()),
        published_date: entry.published,
        provider: Some("arxiv".to_string()),
        raw: Some(raw),
    }
}
