//! HTTP utilities for making deadline-bound requests to search APIs

use crate::error::{SearchError, SearchResult};
use crate::types::remaining;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::time::Instant;
use url::Url;

const USER_AGENT: &str = concat!("multisearch/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper with search-specific functionality
///
/// Every request is bounded by the caller's deadline: the remaining time
/// becomes the request timeout, and a request issued after the deadline
/// fails with [`SearchError::Timeout`] without touching the network.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self::with_user_agent(USER_AGENT)
    }

    /// Create a client that identifies itself with `user_agent`
    pub fn with_user_agent(user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|err| {
                log::warn!("falling back to default HTTP client: {err}");
                Client::new()
            });
        Self { client }
    }

    /// GET `url` and deserialize the JSON body
    pub async fn get_json<T>(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        deadline: Instant,
    ) -> SearchResult<T>
    where
        T: DeserializeOwned,
    {
        let request = with_headers(self.client.get(url), headers);
        let response = send(request, deadline).await?;
        let text = read_body(response, deadline).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET `url` and return the body as text
    pub async fn get_text(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        deadline: Instant,
    ) -> SearchResult<String> {
        let request = with_headers(self.client.get(url), headers);
        let response = send(request, deadline).await?;
        read_body(response, deadline).await
    }

    /// POST form data to `url` and return the body as text
    pub async fn post_form_text(
        &self,
        url: &str,
        form_data: &HashMap<String, String>,
        headers: &HashMap<String, String>,
        deadline: Instant,
    ) -> SearchResult<String> {
        let request = with_headers(self.client.post(url).form(form_data), headers);
        let response = send(request, deadline).await?;
        read_body(response, deadline).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers(mut request: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    for (key, value) in headers {
        request = request.header(key, value);
    }
    request
}

async fn send(request: RequestBuilder, deadline: Instant) -> SearchResult<Response> {
    let budget = remaining(deadline);
    if budget.is_zero() {
        return Err(SearchError::Timeout { timeout_ms: 0 });
    }

    request
        .timeout(budget)
        .send()
        .await
        .map_err(|err| with_timeout_budget(err.into(), budget.as_millis() as u64))
}

/// Return the body of a 2xx response, or an `HttpError` carrying the body
async fn read_body(response: Response, deadline: Instant) -> SearchResult<String> {
    let status = response.status();
    let body = tokio::time::timeout_at(deadline, response.text())
        .await
        .map_err(|_| SearchError::Timeout { timeout_ms: 0 })?;

    if status.is_success() {
        Ok(body?)
    } else {
        Err(SearchError::HttpError {
            message: format!("Request failed with status: {status}"),
            status_code: Some(status.as_u16()),
            response_body: body.ok(),
        })
    }
}

fn with_timeout_budget(error: SearchError, budget_ms: u64) -> SearchError {
    match error {
        SearchError::Timeout { .. } => SearchError::Timeout {
            timeout_ms: budget_ms,
        },
        other => other,
    }
}

/// Build a URL with query parameters
pub fn build_url(base_url: &str, params: &[(&str, String)]) -> SearchResult<String> {
    let mut url = Url::parse(base_url)?;

    for (key, value) in params {
        url.query_pairs_mut().append_pair(key, value);
    }

    Ok(url.to_string())
}

/// Extract domain from a URL
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_string()))
}

/// Normalize text by removing excess whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize URL by ensuring it has a proper scheme
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{url}")
    } else {
        url.to_string()
    }
}
