//! SearXNG provider (JSON output of a self-hosted instance)

use crate::{
    error::{SearchError, SearchResult},
    types::{SafeSearch, SearchOptions, SearchProvider, SearchResult as SearchResultType},
    utils::{debug, http},
};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::time::Instant;

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    url: String,
    #[serde(default)]
    title: String,
    content: Option<String>,
    engine: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
}

#[derive(Debug)]
pub struct SearxNGProvider {
    base_url: String,
    http_client: http::HttpClient,
}

impl SearxNGProvider {
    /// `base_url` is the instance root, e.g. `https://searx.example.org`
    pub fn new(base_url: &str) -> SearchResult<Self> {
        if base_url.is_empty() {
            return Err(SearchError::ConfigError(
                "SearXNG base URL is required".to_string(),
            ));
        }
        url::Url::parse(base_url)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: http::HttpClient::new(),
        })
    }

    fn search_url(&self, options: &SearchOptions) -> SearchResult<String> {
        let mut params = vec![
            ("q", options.query.clone()),
            ("format", "json".to_string()),
            ("pageno", options.page.unwrap_or(1).to_string()),
        ];
        if let Some(language) = &options.language {
            params.push(("language", language.clone()));
        }
        if let Some(safe_search) = options.safe_search {
            let level = match safe_search {
                SafeSearch::Off => "0",
                SafeSearch::Moderate => "1",
                SafeSearch::Strict => "2",
            };
            params.push(("safesearch", level.to_string()));
        }

        http::build_url(&format!("{}/search", self.base_url), &params)
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearxNGProvider {
    fn name(&self) -> &str {
        "searxng"
    }

    async fn search(
        &self,
        options: &SearchOptions,
        deadline: Instant,
    ) -> SearchResult<Vec<SearchResultType>> {
        let url = self.search_url(options)?;
        debug::log_request(&options.debug, "SearXNG request", &url);

        let response: SearxResponse = self
            .http_client
            .get_json(&url, &HashMap::new(), deadline)
            .await?;

        debug::log_response(
            &options.debug,
            &format!("SearXNG returned {} results", response.results.len()),
        );

        let max_results = options.max_results.unwrap_or(10) as usize;
        Ok(response
            .results
            .into_iter()
            .take(max_results)
            .map(|result| {
                let raw = result
                    .engine
                    .as_ref()
                    .map(|engine| serde_json::json!({ "engine": engine }));
                SearchResultType {
                    domain: http::extract_domain(&result.url),
                    title: http::normalize_text(&result.title),
                    snippet: result.content.map(|c| http::normalize_text(&c)),
                    published_date: result.published_date,
                    provider: Some("searxng".to_string()),
                    raw,
                    url: result.url,
                }
            })
            .collect())
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("base_url".to_string(), self.base_url.clone());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_base_url() {
        assert!(matches!(
            SearxNGProvider::new(""),
            Err(SearchError::ConfigError(_))
        ));
        assert!(SearxNGProvider::new("not a url").is_err());
    }

    #[test]
    fn test_search_url_carries_options() {
        let provider = SearxNGProvider::new("https://searx.example.org/").unwrap();
        let options = SearchOptions {
            query: "rust".to_string(),
            page: Some(2),
            language: Some("en".to_string()),
            safe_search: Some(SafeSearch::Strict),
            ..Default::default()
        };

        let url = provider.search_url(&options).unwrap();
        assert!(url.starts_with("https://searx.example.org/search?"));
        assert!(url.contains("q=rust"));
        assert!(url.contains("format=json"));
        assert!(url.contains("pageno=2"));
        assert!(url.contains("language=en"));
        assert!(url.contains("safesearch=2"));
    }
}
