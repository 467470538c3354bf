//! Per-provider call statistics

use crate::error::ClassifiedError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Counters for one provider, as of its completed calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderStats {
    pub total_calls: u64,
    pub successes: u64,
    pub failures: u64,
    /// Sum of the latency of every completed call
    pub total_latency: Duration,
    pub last_latency: Option<Duration>,
    pub last_error: Option<ClassifiedError>,
}

impl ProviderStats {
    /// Mean latency over all completed calls
    pub fn avg_latency(&self) -> Option<Duration> {
        if self.total_calls == 0 {
            return None;
        }
        let nanos = self.total_latency.as_nanos() / u128::from(self.total_calls);
        Some(Duration::from_nanos(nanos.min(u128::from(u64::MAX)) as u64))
    }

    /// Fraction of completed calls that succeeded, in `0.0..=1.0`
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_calls == 0 {
            None
        } else {
            Some(self.successes as f64 / self.total_calls as f64)
        }
    }
}

/// How a single provider call ended
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Success,
    Failure(&'a ClassifiedError),
}

/// Thread-safe statistics table keyed by provider name.
///
/// The key set is fixed at construction; each entry sits behind its own
/// mutex, held only for the few field writes of one completion, so
/// concurrent recordings for different providers never contend and a
/// snapshot never waits on a network call.
#[derive(Debug)]
pub struct StatsRecorder {
    entries: HashMap<String, Mutex<ProviderStats>>,
}

impl StatsRecorder {
    pub fn new<'a>(providers: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = providers
            .into_iter()
            .map(|name| (name.to_string(), Mutex::new(ProviderStats::default())))
            .collect();
        Self { entries }
    }

    /// Record one completed call. All fields of the entry change together.
    pub fn record(&self, provider: &str, outcome: Outcome<'_>, latency: Duration) {
        let Some(entry) = self.entries.get(provider) else {
            log::warn!("dropping stats for unconfigured provider {provider}");
            return;
        };

        let mut stats = lock(entry);
        stats.total_calls += 1;
        stats.total_latency += latency;
        stats.last_latency = Some(latency);
        match outcome {
            Outcome::Success => stats.successes += 1,
            Outcome::Failure(error) => {
                stats.failures += 1;
                stats.last_error = Some(error.clone());
            }
        }
    }

    /// Owned copy of every entry
    pub fn snapshot(&self) -> HashMap<String, ProviderStats> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), lock(entry).clone()))
            .collect()
    }

    pub fn get(&self, provider: &str) -> Option<ProviderStats> {
        self.entries.get(provider).map(|entry| lock(entry).clone())
    }
}

// Poisoning is ignored: every write completes before the guard drops.
fn lock(entry: &Mutex<ProviderStats>) -> MutexGuard<'_, ProviderStats> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
