//! DuckDuckGo search provider (uses HTML scraping)

use crate::{
    error::{SearchError, SearchResult},
    types::{SearchOptions, SearchProvider, SearchResult as SearchResultType},
    utils::{debug, http},
};
use scraper::{Html, Selector};
use std::collections::HashMap;
use tokio::time::Instant;

/// DuckDuckGo configuration
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    /// Base URL for the HTML endpoint
    pub base_url: String,
    /// User agent for requests
    pub user_agent: String,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com/html".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

/// DuckDuckGo search provider
#[derive(Debug)]
pub struct DuckDuckGoProvider {
    config: DuckDuckGoConfig,
    http_client: http::HttpClient,
}

impl DuckDuckGoProvider {
    /// Create a new DuckDuckGo provider with default configuration
    pub fn new() -> Self {
        Self::with_config(DuckDuckGoConfig::default())
    }

    /// Create a new DuckDuckGo provider with custom configuration
    pub fn with_config(config: DuckDuckGoConfig) -> Self {
        Self {
            http_client: http::HttpClient::with_user_agent(&config.user_agent),
            config,
        }
    }

    /// Point the provider at another endpoint (for testing)
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_config(DuckDuckGoConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(
        &self,
        options: &SearchOptions,
        deadline: Instant,
    ) -> SearchResult<Vec<SearchResultType>> {
        let mut headers = HashMap::new();
        headers.insert(
            "Referer".to_string(),
            "https://html.duckduckgo.com/".to_string(),
        );

        let mut form_data = HashMap::new();
        form_data.insert("q".to_string(), options.query.clone());
        form_data.insert("b".to_string(), String::new());
        form_data.insert(
            "kl".to_string(),
            options.region.clone().unwrap_or_else(|| "wt-wt".to_string()),
        );

        debug::log_request(
            &options.debug,
            "DuckDuckGo request",
            &format!("query: {}", options.query),
        );

        let html = self
            .http_client
            .post_form_text(&self.config.base_url, &form_data, &headers, deadline)
            .await?;

        debug::log_response(
            &options.debug,
            &format!("DuckDuckGo HTML response received (length: {})", html.len()),
        );

        parse_results(&html, options.max_results.unwrap_or(10) as usize)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.config.base_url.clone());
        config
    }
}

/// Extract results from a DuckDuckGo HTML results page
fn parse_results(html: &str, max_results: usize) -> SearchResult<Vec<SearchResultType>> {
    let document = Html::parse_document(html);

    let result_selector = Selector::parse("div.result")
        .map_err(|_| SearchError::ParseError("Invalid CSS selector for results".to_string()))?;
    let link_selector = Selector::parse("h2.result__title a")
        .map_err(|_| SearchError::ParseError("Invalid CSS selector for links".to_string()))?;
    let snippet_selector = Selector::parse(".result__snippet")
        .map_err(|_| SearchError::ParseError("Invalid CSS selector for snippets".to_string()))?;

    let mut results = Vec::new();
    for block in document.select(&result_selector) {
        if results.len() >= max_results {
            break;
        }

        let Some(link) = block.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        // Ads and internal redirects point back at DuckDuckGo
        if href.contains("duckduckgo.com") {
            continue;
        }

        let url = http::normalize_url(href);
        let title = http::normalize_text(&link.text().collect::<String>());
        let snippet = block
            .select(&snippet_selector)
            .next()
            .map(|s| http::normalize_text(&s.text().collect::<String>()))
            .filter(|s| !s.is_empty());

        results.push(SearchResultType {
            domain: http::extract_domain(&url),
            url,
            title,
            snippet,
            published_date: None,
            provider: Some("duckduckgo".to_string()),
            raw: None,
        });
    }

    Ok(results)
}
