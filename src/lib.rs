//! # multisearch
//!
//! Query one or more web search backends through a single normalized
//! interface and result shape.
//!
//! Providers implement [`SearchProvider`]. A [`MultiProviderSearch`] owns an
//! ordered provider list and one [`MultiProviderStrategy`]:
//!
//! - **Aggregate**: call every provider concurrently, merge and deduplicate.
//! - **Failover**: call providers in priority order until one succeeds.
//! - **LoadBalance**: rotate the starting provider across calls, fall back
//!   through the rest on failure.
//! - **Race**: call every provider concurrently, keep the first success.
//!
//! Failures are classified into a fixed [`ErrorKind`] taxonomy. When every
//! attempted provider fails the caller gets a [`MultiError`] listing each
//! attempt. Per-provider call statistics are available through
//! [`MultiProviderSearch::stats`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multisearch::{
//!     multi_provider::{MultiProviderSearch, MultiProviderStrategy},
//!     providers::{ArxivProvider, DuckDuckGoProvider},
//!     SearchOptions, SearchProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let providers: Vec<Box<dyn SearchProvider>> = vec![
//!         Box::new(DuckDuckGoProvider::new()),
//!         Box::new(ArxivProvider::new()),
//!     ];
//!     let search = MultiProviderSearch::new(providers, MultiProviderStrategy::Aggregate, 10)?;
//!
//!     for result in search.search(&SearchOptions::new("rust async runtimes")).await? {
//!         println!("{}: {}", result.title, result.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod multi_provider;
pub mod providers;
pub mod types;
pub mod utils;

// Re-export common types
pub use error::{classify, ClassifiedError, ErrorKind, MultiError, SearchError, SearchResult as Result};
pub use multi_provider::{MultiProviderConfig, MultiProviderSearch, MultiProviderStrategy, ProviderStats};
pub use types::{DebugOptions, SearchOptions, SearchProvider, SearchResult};

use tokio::time::{Duration, Instant};

/// Query a single provider and return its results
///
/// The query's `timeout` (15 s when unset) bounds the call. Failures come
/// back as the provider's own [`SearchError`], so [`classify`] still sees the
/// original status or variant; troubleshooting text goes to the log.
///
/// # Examples
///
/// ```rust,no_run
/// use multisearch::{web_search, providers::DuckDuckGoProvider, SearchOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = DuckDuckGoProvider::new();
/// let results = web_search(&provider, &SearchOptions::new("rust programming")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn web_search(
    provider: &dyn SearchProvider,
    options: &SearchOptions,
) -> Result<Vec<SearchResult>> {
    use utils::debug;

    options.validate()?;

    debug::log(
        &options.debug,
        "Performing search",
        &format!("provider: {}, query: {}", provider.name(), options.query),
    );

    let budget = options
        .timeout_duration()
        .unwrap_or(Duration::from_millis(15000));
    let deadline = Instant::now() + budget;

    let outcome = match tokio::time::timeout_at(deadline, provider.search(options, deadline)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SearchError::Timeout {
            timeout_ms: budget.as_millis() as u64,
        }),
    };

    match &outcome {
        Ok(results) => debug::log_response(
            &options.debug,
            &format!("Received {} results", results.len()),
        ),
        Err(error) => {
            let classified = classify(provider.name(), error);
            log::warn!("{classified}");
            debug::log(
                &options.debug,
                "Troubleshooting",
                &troubleshooting(&classified),
            );
        }
    }

    outcome
}

/// Troubleshooting text for a classified failure, provider-specific when
/// the failure kind alone says nothing useful
pub fn troubleshooting(error: &ClassifiedError) -> String {
    if error.kind != ErrorKind::Unknown {
        return error.kind.hint().to_string();
    }

    match error.provider.as_str() {
        "brave" => "Ensure your Brave Search API token is valid. Check your subscription status in the Brave Developer Hub.".to_string(),
        "searxng" => "Check if your SearXNG instance URL is correct and that the server is running with the JSON output format enabled.".to_string(),
        "duckduckgo" => "You may be making too many requests to DuckDuckGo. Try adding a delay between requests or reduce your request frequency.".to_string(),
        "arxiv" => "Check the ArXiv IDs or query syntax. The ArXiv API also throttles bursts of requests.".to_string(),
        name => format!(
            "Check your {name} API credentials and make sure your search request is valid."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    // Mock provider for testing
    #[derive(Debug)]
    struct MockProvider {
        name: String,
        error: Option<SearchError>,
        delay_ms: u64,
    }

    impl MockProvider {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                error: None,
                delay_ms: 0,
            }
        }

        fn with_error(mut self, error: SearchError) -> Self {
            self.error = Some(error);
            self
        }

        fn with_delay(mut self, delay_ms: u64) -> Self {
            self.delay_ms = delay_ms;
            self
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn search(&self, _options: &SearchOptions, _deadline: Instant) -> Result<Vec<SearchResult>> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            match &self.error {
                Some(error) => Err(error.clone()),
                None => Ok(vec![
                    SearchResult {
                        provider: Some(self.name.clone()),
                        ..SearchResult::new("https://example.com/1", "Test Result 1")
                    },
                    SearchResult {
                        provider: Some(self.name.clone()),
                        ..SearchResult::new("https://example.com/2", "Test Result 2")
                    },
                ]),
            }
        }
    }

    #[tokio::test]
    async fn test_web_search_success() {
        let provider = MockProvider::new("test");
        let results = web_search(&provider, &SearchOptions::new("test query"))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Test Result 1");
        assert_eq!(results[0].provider, Some("test".to_string()));
    }

    #[tokio::test]
    async fn test_web_search_empty_query() {
        let provider = MockProvider::new("test");
        match web_search(&provider, &SearchOptions::new("")).await {
            Err(SearchError::InvalidInput(msg)) => assert!(msg.contains("search query or ID list")),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_web_search_with_arxiv_id_list() {
        let provider = MockProvider::new("arxiv");
        let options = SearchOptions {
            id_list: Some("1234.5678,2345.6789".to_string()),
            ..Default::default()
        };
        assert_eq!(web_search(&provider, &options).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_web_search_provider_error() {
        let provider = MockProvider::new("test").with_error(SearchError::HttpError {
            status_code: Some(401),
            message: "Unauthorized".to_string(),
            response_body: None,
        });

        let error = web_search(&provider, &SearchOptions::new("test query"))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            SearchError::HttpError {
                status_code: Some(401),
                ..
            }
        ));
        assert_eq!(classify("test", &error).kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_web_search_keeps_error_kind() {
        let cases = [
            (SearchError::ParseError("bad json".to_string()), ErrorKind::ParseError),
            (
                SearchError::HttpError {
                    status_code: Some(502),
                    message: "Bad Gateway".to_string(),
                    response_body: None,
                },
                ErrorKind::ServerError,
            ),
            (
                SearchError::HttpError {
                    status_code: Some(400),
                    message: "Bad Request".to_string(),
                    response_body: None,
                },
                ErrorKind::InvalidRequest,
            ),
        ];

        for (raw, expected) in cases {
            let provider = MockProvider::new("p").with_error(raw);
            let error = web_search(&provider, &SearchOptions::new("q")).await.unwrap_err();
            assert_eq!(classify("p", &error).kind, expected, "{error}");
        }
    }

    #[tokio::test]
    async fn test_web_search_enforces_timeout() {
        let provider = MockProvider::new("slow").with_delay(200);
        let options = SearchOptions {
            query: "test".to_string(),
            timeout: Some(20),
            ..Default::default()
        };

        let error = web_search(&provider, &options).await.unwrap_err();
        assert!(matches!(error, SearchError::Timeout { timeout_ms: 20 }));
        assert_eq!(classify("slow", &error).kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_troubleshooting_by_kind() {
        let cases = [
            (SearchError::RateLimit("x".to_string()), "rate limit"),
            (SearchError::ParseError("x".to_string()), "could not be understood"),
            (
                SearchError::HttpError {
                    status_code: Some(503),
                    message: "x".to_string(),
                    response_body: None,
                },
                "server issues",
            ),
        ];

        for (error, expected) in cases {
            let info = troubleshooting(&classify("any", &error));
            assert!(info.to_lowercase().contains(expected), "'{info}' should contain '{expected}'");
        }
    }

    #[test]
    fn test_troubleshooting_by_provider() {
        let providers = [
            ("brave", "Brave Search API token"),
            ("searxng", "SearXNG instance URL"),
            ("duckduckgo", "too many requests"),
            ("arxiv", "ArXiv IDs"),
            ("custom", "custom API credentials"),
        ];

        let generic_error = SearchError::Other("mystery".to_string());
        for (provider, expected) in providers {
            let info = troubleshooting(&classify(provider, &generic_error));
            assert!(info.contains(expected), "'{provider}' should mention '{expected}'");
        }
    }
}
