//! Brave Search API provider

use crate::{
    error::{SearchError, SearchResult},
    types::{SearchOptions, SearchProvider, SearchResult as SearchResultType},
    utils::{debug, http},
};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::time::Instant;

const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";
/// Brave rejects `count` above this
const MAX_COUNT: u32 = 20;

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    url: String,
    title: String,
    description: Option<String>,
    page_age: Option<String>,
    meta_url: Option<BraveMetaUrl>,
}

#[derive(Debug, Deserialize)]
struct BraveMetaUrl {
    hostname: Option<String>,
}

/// Brave Search provider
#[derive(Debug)]
pub struct BraveProvider {
    api_key: String,
    base_url: String,
    http_client: http::HttpClient,
}

impl BraveProvider {
    pub fn new(api_key: &str) -> SearchResult<Self> {
        if api_key.is_empty() {
            return Err(SearchError::ConfigError(
                "Brave API key is required".to_string(),
            ));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: BRAVE_API_URL.to_string(),
            http_client: http::HttpClient::new(),
        })
    }

    /// Set custom base URL (for testing or proxies)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    fn search_url(&self, options: &SearchOptions) -> SearchResult<String> {
        let count = options.max_results.unwrap_or(10).clamp(1, MAX_COUNT);
        let mut params = vec![("q", options.query.clone()), ("count", count.to_string())];

        // Brave pages by offset in units of `count`
        if let Some(page) = options.page.filter(|p| *p > 1) {
            params.push(("offset", (page - 1).to_string()));
        }
        if let Some(region) = &options.region {
            params.push(("country", region.to_lowercase()));
        }
        if let Some(language) = &options.language {
            params.push(("search_lang", language.clone()));
        }
        if let Some(safe_search) = options.safe_search {
            params.push(("safesearch", safe_search.to_string()));
        }

        http::build_url(&self.base_url, &params)
    }
}

#[async_trait::async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(
        &self,
        options: &SearchOptions,
        deadline: Instant,
    ) -> SearchResult<Vec<SearchResultType>> {
        let url = self.search_url(options)?;
        debug::log_request(&options.debug, "Brave request", &url);

        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert("X-Subscription-Token".to_string(), self.api_key.clone());

        let response: BraveResponse = self.http_client.get_json(&url, &headers, deadline).await?;
        let results = response.web.map(|web| web.results).unwrap_or_default();

        debug::log_response(
            &options.debug,
            &format!("Brave returned {} results", results.len()),
        );

        Ok(results
            .into_iter()
            .map(|result| SearchResultType {
                domain: result
                    .meta_url
                    .and_then(|meta| meta.hostname)
                    .or_else(|| http::extract_domain(&result.url)),
                title: http::normalize_text(&result.title),
                snippet: result.description.map(|d| http::normalize_text(&d)),
                published_date: result.page_age,
                provider: Some("brave".to_string()),
                raw: None,
                url: result.url,
            })
            .collect())
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("api_key".to_string(), "***".to_string());
        config.insert("base_url".to_string(), self.base_url.clone());
        config
    }
}
