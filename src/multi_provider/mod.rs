//! Multi-provider search: aggregation, failover, load balancing and racing

mod engine;
pub mod merge;
pub mod stats;

pub use stats::{ProviderStats, StatsRecorder};

use crate::{
    error::{SearchError, SearchResult as Result},
    types::{SearchOptions, SearchProvider, SearchResult},
    utils::debug,
};
use engine::Dispatch;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicUsize;
use tokio::time::{Duration, Instant};

/// Strategy for using multiple providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiProviderStrategy {
    /// Use providers in sequence until one succeeds
    Failover,
    /// Load balance requests across providers (round-robin)
    LoadBalance,
    /// Query all providers and merge results
    Aggregate,
    /// Query all providers, keep the first successful answer
    Race,
}

impl fmt::Display for MultiProviderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiProviderStrategy::Failover => write!(f, "failover"),
            MultiProviderStrategy::LoadBalance => write!(f, "load-balance"),
            MultiProviderStrategy::Aggregate => write!(f, "aggregate"),
            MultiProviderStrategy::Race => write!(f, "race"),
        }
    }
}

impl FromStr for MultiProviderStrategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "failover" => Ok(MultiProviderStrategy::Failover),
            "load-balance" | "loadbalance" => Ok(MultiProviderStrategy::LoadBalance),
            "aggregate" => Ok(MultiProviderStrategy::Aggregate),
            "race" | "race-first" => Ok(MultiProviderStrategy::Race),
            other => Err(SearchError::ConfigError(format!(
                "Unknown strategy '{other}'"
            ))),
        }
    }
}

/// Configuration for multi-provider searches
#[derive(Debug)]
pub struct MultiProviderConfig {
    /// Ordered providers: priority for failover, rotation order for load balancing
    pub providers: Vec<Box<dyn SearchProvider>>,
    pub strategy: MultiProviderStrategy,
    /// Upper bound on any single provider call
    pub timeout_per_provider: Duration,
    /// Overall deadline for a search whose query carries no timeout
    pub default_deadline: Duration,
    /// Overall cap on returned results
    pub max_results: usize,
    /// Fan-out width for aggregate and race; `None` dispatches all at once
    pub max_concurrent: Option<usize>,
}

impl MultiProviderConfig {
    pub fn new(strategy: MultiProviderStrategy) -> Self {
        Self {
            providers: Vec::new(),
            strategy,
            timeout_per_provider: Duration::from_secs(10),
            default_deadline: Duration::from_secs(15),
            max_results: 10,
            max_concurrent: None,
        }
    }

    pub fn add_provider(mut self, provider: Box<dyn SearchProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_per_provider = timeout;
        self
    }

    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = deadline;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    /// Non-empty provider list with unique names
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(SearchError::ConfigError(
                "No providers configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.name()) {
                return Err(SearchError::ConfigError(format!(
                    "Duplicate provider name '{}'",
                    provider.name()
                )));
            }
        }

        if self.max_concurrent == Some(0) {
            return Err(SearchError::ConfigError(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Multi-provider search manager
///
/// Providers and strategy are fixed at construction. The statistics table
/// and the load-balancing cursor are the only mutable state; both are
/// updated through `&self`, so one instance can serve concurrent searches
/// (wrap it in an `Arc` to share it across tasks).
#[derive(Debug)]
pub struct MultiProviderSearch {
    config: MultiProviderConfig,
    stats: StatsRecorder,
    cursor: AtomicUsize,
}

impl MultiProviderSearch {
    /// Build a facade over `providers` with the given strategy and result cap
    pub fn new(
        providers: Vec<Box<dyn SearchProvider>>,
        strategy: MultiProviderStrategy,
        max_results: usize,
    ) -> Result<Self> {
        let mut config = MultiProviderConfig::new(strategy).with_max_results(max_results);
        config.providers = providers;
        Self::with_config(config)
    }

    pub fn with_config(config: MultiProviderConfig) -> Result<Self> {
        config.validate()?;

        let stats = StatsRecorder::new(config.providers.iter().map(|p| p.name()));
        log::debug!(
            "configured {} strategy over [{}]",
            config.strategy,
            config
                .providers
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            config,
            stats,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Perform search using the configured strategy
    pub async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        options.validate()?;

        let max_results = self.effective_max_results(options);
        if max_results == 0 {
            debug::log(&options.debug, "max_results is 0, skipping providers", "");
            return Ok(Vec::new());
        }

        let overall = options
            .timeout_duration()
            .unwrap_or(self.config.default_deadline);

        let mut provider_options = options.clone();
        provider_options.max_results = Some(u32::try_from(max_results).unwrap_or(u32::MAX));

        debug::log(
            &options.debug,
            "Performing multi-provider search",
            &format!("strategy: {}, query: {}", self.config.strategy, options.query),
        );

        let dispatch = Dispatch {
            providers: &self.config.providers,
            stats: &self.stats,
            options: &provider_options,
            deadline: Instant::now() + overall,
            provider_timeout: self.config.timeout_per_provider,
            max_concurrent: self
                .config
                .max_concurrent
                .unwrap_or(self.config.providers.len())
                .max(1),
            max_results,
        };

        match self.config.strategy {
            MultiProviderStrategy::Failover => dispatch.failover().await,
            MultiProviderStrategy::LoadBalance => dispatch.load_balance(&self.cursor).await,
            MultiProviderStrategy::Aggregate => dispatch.aggregate().await,
            MultiProviderStrategy::Race => dispatch.race().await,
        }
    }

    /// Snapshot of provider statistics as of completed calls
    pub fn stats(&self) -> HashMap<String, ProviderStats> {
        self.stats.snapshot()
    }

    pub fn strategy(&self) -> MultiProviderStrategy {
        self.config.strategy
    }

    /// Provider names in configured order
    pub fn provider_names(&self) -> Vec<&str> {
        self.config.providers.iter().map(|p| p.name()).collect()
    }

    fn effective_max_results(&self, options: &SearchOptions) -> usize {
        options
            .max_results
            .map_or(self.config.max_results, |m| m as usize)
            .min(self.config.max_results)
    }
}
