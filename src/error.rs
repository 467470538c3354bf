//! Error types, failure taxonomy and classification for the search SDK

use std::fmt;
use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Raw failures produced by providers and by the orchestration layer
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parsing error (JSON, XML, HTML)
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Connection-level failure (DNS, refused, reset)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Every attempted provider failed
    #[error(transparent)]
    AllProvidersFailed(MultiError),

    /// Generic error for unhandled cases
    #[error("Search error: {0}")]
    Other(String),
}

impl SearchError {
    /// The composite failure, if this error is one
    pub fn as_multi(&self) -> Option<&MultiError> {
        match self {
            SearchError::AllProvidersFailed(multi) => Some(multi),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SearchError::Timeout { timeout_ms: 0 }
        } else if error.is_status() {
            let status_code = error.status().map(|s| s.as_u16());
            let message = error.to_string();

            match status_code {
                Some(401 | 403) => SearchError::AuthenticationError(message),
                Some(429) => SearchError::RateLimit(message),
                _ => SearchError::HttpError {
                    message,
                    status_code,
                    response_body: None,
                },
            }
        } else if error.is_decode() {
            SearchError::ParseError(format!("Response decoding failed: {error}"))
        } else if error.is_connect() || error.is_request() {
            SearchError::NetworkError(error.to_string())
        } else {
            SearchError::HttpError {
                message: error.to_string(),
                status_code: None,
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<quick_xml::DeError> for SearchError {
    fn from(error: quick_xml::DeError) -> Self {
        SearchError::ParseError(format!("XML parsing failed: {error}"))
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::InvalidInput(format!("Invalid URL: {error}"))
    }
}

impl From<std::io::Error> for SearchError {
    fn from(error: std::io::Error) -> Self {
        SearchError::Other(format!("IO error: {error}"))
    }
}

/// Fixed failure taxonomy every provider error is mapped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    Authentication,
    RateLimit,
    InvalidRequest,
    ServerError,
    NetworkError,
    ParseError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether trying again later (or elsewhere) can plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout
                | ErrorKind::RateLimit
                | ErrorKind::ServerError
                | ErrorKind::NetworkError
        )
    }

    /// Troubleshooting suggestion shown to users alongside the failure
    pub fn hint(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => {
                "The provider did not answer in time. Raise the timeout or try again later."
            }
            ErrorKind::Authentication => {
                "This is likely an authentication issue. Check your API key and make sure it's valid and has the correct permissions."
            }
            ErrorKind::RateLimit => {
                "You've exceeded the rate limit for this API. Try again later or reduce your request frequency."
            }
            ErrorKind::InvalidRequest => {
                "This is likely due to invalid request parameters. Check your query and other search options."
            }
            ErrorKind::ServerError => {
                "The search provider is experiencing server issues. Try again later."
            }
            ErrorKind::NetworkError => {
                "The provider could not be reached. Check the endpoint URL and your network connection."
            }
            ErrorKind::ParseError => {
                "The provider answered with a payload that could not be understood. The API format may have changed."
            }
            ErrorKind::Unknown => {
                "Check your provider credentials and make sure your search request is valid."
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider failure after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.provider, self.kind, self.message)
    }
}

impl std::error::Error for ClassifiedError {}

/// Ordered per-provider failures of a single search, in attempt order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiError {
    failures: Vec<ClassifiedError>,
}

impl MultiError {
    pub fn new(failures: Vec<ClassifiedError>) -> Self {
        Self { failures }
    }

    pub fn push(&mut self, failure: ClassifiedError) {
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[ClassifiedError] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<ClassifiedError> {
        self.failures
    }

    pub fn providers(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.provider.as_str()).collect()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.failures.iter().map(|f| f.kind).collect()
    }

    /// True when every failure has the given kind (e.g. everyone is rate-limited)
    pub fn all_of_kind(&self, kind: ErrorKind) -> bool {
        !self.failures.is_empty() && self.failures.iter().all(|f| f.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "All {} provider attempt(s) failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}

/// Map a raw provider failure into the fixed taxonomy.
///
/// Pure: the outcome depends only on `error`, and `provider` is carried
/// through so composite errors can attribute each failure.
pub fn classify(provider: &str, error: &SearchError) -> ClassifiedError {
    ClassifiedError {
        provider: provider.to_string(),
        kind: kind_of(error),
        message: error.to_string(),
    }
}

fn kind_of(error: &SearchError) -> ErrorKind {
    match error {
        SearchError::Timeout { .. } => ErrorKind::Timeout,
        SearchError::AuthenticationError(_) => ErrorKind::Authentication,
        SearchError::RateLimit(_) => ErrorKind::RateLimit,
        SearchError::InvalidInput(_) | SearchError::ConfigError(_) => ErrorKind::InvalidRequest,
        SearchError::ParseError(_) => ErrorKind::ParseError,
        SearchError::NetworkError(_) => ErrorKind::NetworkError,
        SearchError::HttpError {
            status_code,
            message,
            ..
        } => match status_code {
            Some(status) => kind_from_status(*status),
            None => sniff_message(message).unwrap_or(ErrorKind::NetworkError),
        },
        SearchError::ProviderError(message) | SearchError::Other(message) => {
            sniff_message(message).unwrap_or(ErrorKind::Unknown)
        }
        SearchError::AllProvidersFailed(multi) => {
            let kinds = multi.kinds();
            match kinds.first() {
                Some(first) if kinds.iter().all(|k| k == first) => *first,
                _ => ErrorKind::Unknown,
            }
        }
    }
}

fn kind_from_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::Authentication,
        408 | 504 => ErrorKind::Timeout,
        429 => ErrorKind::RateLimit,
        400..=499 => ErrorKind::InvalidRequest,
        500..=599 => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

/// Best-effort keyword match for adapters that only report free text
fn sniff_message(message: &str) -> Option<ErrorKind> {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["rate limit", "too many requests", "quota"]) {
        Some(ErrorKind::RateLimit)
    } else if has(&["unauthorized", "forbidden", "api key", "invalid key", "authentication"]) {
        Some(ErrorKind::Authentication)
    } else if has(&["timed out", "timeout", "deadline"]) {
        Some(ErrorKind::Timeout)
    } else if has(&["parse", "deserialize", "malformed"]) {
        Some(ErrorKind::ParseError)
    } else if has(&["connection", "dns", "unreachable"]) {
        Some(ErrorKind::NetworkError)
    } else {
        None
    }
}
