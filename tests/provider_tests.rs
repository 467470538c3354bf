//! Provider adapter tests against mocked HTTP backends
//!
//! Each adapter is pointed at a wiremock server; the tests check request
//! shape, response parsing and how transport failures are classified.

use serde_json::json;
use serial_test::serial;
use std::time::Duration;
use multisearch::{
    error::{ErrorKind, SearchError},
    multi_provider::{MultiProviderConfig, MultiProviderSearch, MultiProviderStrategy},
    providers::*,
    types::{SearchOptions, SearchProvider, SortBy, SortOrder},
    web_search,
};
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn searxng_body() -> serde_json::Value {
    json!({
        "query": "rust",
        "results": [
            {
                "url": "https://www.rust-lang.org/",
                "title": "Rust  Programming Language",
                "content": "A language empowering everyone.",
                "engine": "duckduckgo"
            },
            {
                "url": "https://doc.rust-lang.org/book/",
                "title": "The Rust Book",
                "publishedDate": "2024-01-01T00:00:00"
            }
        ]
    })
}

fn brave_body() -> serde_json::Value {
    json!({
        "type": "search",
        "web": {
            "results": [
                {
                    "title": "Rust Programming Language",
                    "url": "https://www.rust-lang.org",
                    "description": "Fast, reliable, productive.",
                    "page_age": "2024-05-01T00:00:00",
                    "meta_url": { "hostname": "www.rust-lang.org" }
                },
                {
                    "title": "Tokio",
                    "url": "https://tokio.rs/",
                    "description": "An asynchronous runtime."
                }
            ]
        }
    })
}

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>The dominant sequence transduction models...</summary>
    <author><name>Ashish Vaswani</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

const DUCKDUCKGO_PAGE: &str = r#"<html><body>
  <div class="result">
    <h2 class="result__title"><a href="https://www.rust-lang.org/">Rust Programming Language</a></h2>
    <a class="result__snippet">A language empowering everyone.</a>
  </div>
</body></html>"#;

async fn brave_server(status: u16) -> (MockServer, BraveProvider) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": status })))
        .mount(&server)
        .await;

    let provider = BraveProvider::new("test-key")
        .unwrap()
        .with_base_url(&format!("{}/res/v1/web/search", server.uri()));
    (server, provider)
}

async fn classify_single_failure(provider: Box<dyn SearchProvider>) -> (ErrorKind, String) {
    let search = MultiProviderSearch::new(vec![provider], MultiProviderStrategy::Failover, 10).unwrap();
    let error = search.search(&SearchOptions::new("rust")).await.unwrap_err();
    let failure = &error.as_multi().expect("expected AllProvidersFailed").failures()[0];
    (failure.kind, failure.message.clone())
}

#[tokio::test]
async fn test_searxng_parses_json_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searxng_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = SearxNGProvider::new(&server.uri()).unwrap();
    let results = web_search(&provider, &SearchOptions::new("rust")).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Rust Programming Language");
    assert_eq!(results[0].domain.as_deref(), Some("www.rust-lang.org"));
    assert_eq!(results[0].provider.as_deref(), Some("searxng"));
    assert_eq!(results[0].raw.as_ref().unwrap()["engine"], "duckduckgo");
    assert_eq!(results[1].snippet, None);
    assert_eq!(results[1].published_date.as_deref(), Some("2024-01-01T00:00:00"));
}

#[tokio::test]
async fn test_searxng_server_error_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let provider = SearxNGProvider::new(&server.uri()).unwrap();
    let (kind, _) = classify_single_failure(Box::new(provider)).await;
    assert_eq!(kind, ErrorKind::ServerError);
}

#[tokio::test]
async fn test_searxng_malformed_json_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let provider = SearxNGProvider::new(&server.uri()).unwrap();
    let (kind, _) = classify_single_failure(Box::new(provider)).await;
    assert_eq!(kind, ErrorKind::ParseError);
}

#[tokio::test]
async fn test_brave_sends_token_and_parses_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(header("X-Subscription-Token", "test-key"))
        .and(query_param("q", "rust"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brave_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = BraveProvider::new("test-key")
        .unwrap()
        .with_base_url(&format!("{}/res/v1/web/search", server.uri()));
    let options = SearchOptions {
        max_results: Some(5),
        ..SearchOptions::new("rust")
    };
    let results = web_search(&provider, &options).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://www.rust-lang.org");
    assert_eq!(results[0].snippet.as_deref(), Some("Fast, reliable, productive."));
    assert_eq!(results[0].published_date.as_deref(), Some("2024-05-01T00:00:00"));
    assert_eq!(results[1].domain.as_deref(), Some("tokio.rs"));
}

#[tokio::test]
async fn test_brave_missing_web_section_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "search" })))
        .mount(&server)
        .await;

    let provider = BraveProvider::new("test-key").unwrap().with_base_url(&server.uri());
    let results = web_search(&provider, &SearchOptions::new("rust")).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_brave_http_statuses_are_classified() {
    let cases = [
        (401, ErrorKind::Authentication),
        (403, ErrorKind::Authentication),
        (429, ErrorKind::RateLimit),
        (422, ErrorKind::InvalidRequest),
        (503, ErrorKind::ServerError),
    ];

    for (status, expected) in cases {
        let (_server, provider) = brave_server(status).await;
        let (kind, _) = classify_single_failure(Box::new(provider)).await;
        assert_eq!(kind, expected, "status {status}");
    }
}

#[tokio::test]
#[serial(timing)]
async fn test_slow_backend_hits_provider_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(brave_body())
                .set_delay(Duration::from_millis(1_500)),
        )
        .mount(&server)
        .await;

    let provider = BraveProvider::new("test-key").unwrap().with_base_url(&server.uri());
    let config = MultiProviderConfig::new(MultiProviderStrategy::Failover)
        .add_provider(Box::new(provider))
        .with_timeout(Duration::from_millis(100));
    let search = MultiProviderSearch::with_config(config).unwrap();

    let error = search.search(&SearchOptions::new("rust")).await.unwrap_err();
    assert_eq!(error.as_multi().unwrap().kinds(), vec![ErrorKind::Timeout]);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // nothing listens on the discard port
    let provider = SearxNGProvider::new("http://127.0.0.1:9").unwrap();
    let (kind, _) = classify_single_failure(Box::new(provider)).await;
    assert_eq!(kind, ErrorKind::NetworkError);
}

#[tokio::test]
async fn test_arxiv_id_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("id_list", "1706.03762"))
        .and(query_param("sortBy", "submittedDate"))
        .and(query_param("sortOrder", "ascending"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/atom+xml")
                .set_body_string(ARXIV_FEED),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = ArxivProvider::new().with_base_url(&format!("{}/api/query", server.uri()));
    let options = SearchOptions {
        id_list: Some("1706.03762".to_string()),
        sort_by: Some(SortBy::SubmittedDate),
        sort_order: Some(SortOrder::Ascending),
        ..Default::default()
    };
    let results = web_search(&provider, &options).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Attention Is All You Need");
    assert_eq!(results[0].url, "http://arxiv.org/abs/1706.03762v7");
    assert_eq!(results[0].raw.as_ref().unwrap()["authors"], "Ashish Vaswani");
}

#[tokio::test]
async fn test_arxiv_bad_request_is_invalid_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("malformed id"))
        .mount(&server)
        .await;

    let provider = ArxivProvider::new().with_base_url(&server.uri());
    let (kind, _) = classify_single_failure(Box::new(provider)).await;
    assert_eq!(kind, ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_duckduckgo_posts_form_and_scrapes_html() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html"))
        .and(body_string_contains("q=rust+lang"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DUCKDUCKGO_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::with_base_url(&format!("{}/html", server.uri()));
    let results = web_search(&provider, &SearchOptions::new("rust lang")).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://www.rust-lang.org/");
    assert_eq!(results[0].provider.as_deref(), Some("duckduckgo"));
}

#[tokio::test]
async fn test_aggregate_across_real_adapters_deduplicates() {
    let searx = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searxng_body()))
        .mount(&searx)
        .await;

    let brave = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brave_body()))
        .mount(&brave)
        .await;

    let providers: Vec<Box<dyn SearchProvider>> = vec![
        Box::new(SearxNGProvider::new(&searx.uri()).unwrap()),
        Box::new(BraveProvider::new("k").unwrap().with_base_url(&brave.uri())),
    ];
    let search = MultiProviderSearch::new(providers, MultiProviderStrategy::Aggregate, 10).unwrap();
    let merged = search.search(&SearchOptions::new("rust")).await.unwrap();

    // rust-lang.org appears in both backends under equivalent URLs
    let urls: Vec<&str> = merged.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://www.rust-lang.org/",
            "https://doc.rust-lang.org/book/",
            "https://tokio.rs/",
        ]
    );
    assert_eq!(merged[0].provider.as_deref(), Some("searxng"));
}

#[tokio::test]
async fn test_failover_moves_past_rate_limited_adapter() {
    let (_limited_server, limited) = brave_server(429).await;

    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(searxng_body()))
        .mount(&healthy)
        .await;

    let providers: Vec<Box<dyn SearchProvider>> = vec![
        Box::new(limited),
        Box::new(SearxNGProvider::new(&healthy.uri()).unwrap()),
    ];
    let search = MultiProviderSearch::new(providers, MultiProviderStrategy::Failover, 10).unwrap();

    let results = search.search(&SearchOptions::new("rust")).await.unwrap();
    assert_eq!(results[0].provider.as_deref(), Some("searxng"));

    let stats = search.stats();
    assert_eq!(stats["brave"].failures, 1);
    assert_eq!(
        stats["brave"].last_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::RateLimit)
    );
    assert_eq!(stats["searxng"].successes, 1);
}

#[test]
fn test_constructors_validate_configuration() {
    assert!(matches!(BraveProvider::new(""), Err(SearchError::ConfigError(_))));
    assert!(matches!(SearxNGProvider::new(""), Err(SearchError::ConfigError(_))));
    assert!(SearxNGProvider::new("https://searx.example.org").is_ok());
}
