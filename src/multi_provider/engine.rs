//! Strategy execution: dispatching one query across configured providers

use super::merge::merge;
use super::stats::{Outcome, StatsRecorder};
use crate::{
    error::{classify, ClassifiedError, MultiError, SearchError, SearchResult as Result},
    types::{SearchOptions, SearchProvider, SearchResult},
    utils::debug,
};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Everything one `search` call needs, borrowed from the facade.
///
/// Built fresh per call; the only state that outlives it is the stats
/// table and the rotation cursor, both owned by the facade.
pub(crate) struct Dispatch<'a> {
    pub providers: &'a [Box<dyn SearchProvider>],
    pub stats: &'a StatsRecorder,
    /// Query as handed to every provider, already carrying the result cap
    pub options: &'a SearchOptions,
    pub deadline: Instant,
    pub provider_timeout: Duration,
    pub max_concurrent: usize,
    pub max_results: usize,
}

impl Dispatch<'_> {
    /// Call every provider concurrently, merge whatever succeeded.
    pub async fn aggregate(&self) -> Result<Vec<SearchResult>> {
        debug::log(&self.options.debug, "Aggregating results from all providers", "");

        let outcomes: Vec<_> = stream::iter(0..self.providers.len())
            .map(|index| self.invoke(index))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut lists = Vec::new();
        let mut failures = MultiError::default();
        for outcome in outcomes {
            match outcome {
                Ok(results) => lists.push(results),
                Err(error) => failures.push(error),
            }
        }

        if lists.is_empty() {
            return Err(SearchError::AllProvidersFailed(failures));
        }

        let succeeded = lists.len();
        let merged = merge(lists, self.max_results);
        log::info!(
            "aggregated {} results from {} provider(s), {} failed",
            merged.len(),
            succeeded,
            failures.len()
        );
        Ok(merged)
    }

    /// Try providers one at a time in priority order until one succeeds.
    pub async fn failover(&self) -> Result<Vec<SearchResult>> {
        self.sequential(0..self.providers.len(), "failover").await
    }

    /// Start at the provider under the rotation cursor, then try the rest
    /// in rotation order. The cursor advances once per call regardless of
    /// outcome.
    pub async fn load_balance(&self, cursor: &AtomicUsize) -> Result<Vec<SearchResult>> {
        let count = self.providers.len();
        let start = cursor.fetch_add(1, Ordering::Relaxed) % count;

        debug::log(
            &self.options.debug,
            "Load balancing to provider",
            self.providers[start].name(),
        );

        self.sequential((0..count).map(move |offset| (start + offset) % count), "load-balance")
            .await
    }

    /// Call every provider concurrently, return the first success.
    ///
    /// Failures do not end the race. Returning drops the remaining calls,
    /// which cancels them; cancelled calls never complete and are not
    /// recorded.
    pub async fn race(&self) -> Result<Vec<SearchResult>> {
        debug::log(&self.options.debug, "Racing all providers", "");

        let mut pending = stream::iter(0..self.providers.len())
            .map(|index| async move { (index, self.invoke(index).await) })
            .buffer_unordered(self.max_concurrent);

        let mut failures: Vec<(usize, ClassifiedError)> = Vec::new();
        while let Some((index, outcome)) = pending.next().await {
            match outcome {
                Ok(results) => {
                    log::info!("race won by {}", self.providers[index].name());
                    return Ok(results);
                }
                Err(error) => failures.push((index, error)),
            }
        }

        // completion order is timing-dependent; report in dispatch order
        failures.sort_by_key(|(index, _)| *index);
        Err(SearchError::AllProvidersFailed(MultiError::new(
            failures.into_iter().map(|(_, error)| error).collect(),
        )))
    }

    /// Shared loop for the single-source strategies: at most one call in
    /// flight, stop on first success or once the overall deadline passes.
    async fn sequential(
        &self,
        order: impl Iterator<Item = usize>,
        strategy: &str,
    ) -> Result<Vec<SearchResult>> {
        let mut failures = MultiError::default();

        for index in order {
            if !failures.is_empty() && Instant::now() >= self.deadline {
                log::warn!(
                    "{strategy}: deadline reached after {} attempt(s)",
                    failures.len()
                );
                break;
            }

            let name = self.providers[index].name();
            debug::log(&self.options.debug, &format!("Trying {strategy} provider"), name);

            match self.invoke(index).await {
                Ok(results) => return Ok(results),
                Err(error) => failures.push(error),
            }
        }

        Err(SearchError::AllProvidersFailed(failures))
    }

    /// Run one provider under `min(overall remaining, provider timeout)`,
    /// record the completion and classify any failure.
    async fn invoke(&self, index: usize) -> std::result::Result<Vec<SearchResult>, ClassifiedError> {
        let provider = &self.providers[index];
        let name = provider.name();
        let now = Instant::now();
        let call_deadline = self.deadline.min(now + self.provider_timeout);
        let budget = call_deadline.saturating_duration_since(now);

        debug::log_request(
            &self.options.debug,
            "Dispatching provider",
            &format!("{name} (budget {}ms)", budget.as_millis()),
        );

        let outcome = match timeout_at(call_deadline, provider.search(self.options, call_deadline)).await
        {
            Ok(Ok(mut results)) => {
                results.truncate(self.max_results);
                for result in results.iter_mut() {
                    result.provider.get_or_insert_with(|| name.to_string());
                }
                Ok(results)
            }
            Ok(Err(error)) => Err(classify(name, &error)),
            Err(_) => Err(classify(
                name,
                &SearchError::Timeout {
                    timeout_ms: budget.as_millis() as u64,
                },
            )),
        };
        let latency = now.elapsed();

        match &outcome {
            Ok(results) => {
                self.stats.record(name, Outcome::Success, latency);
                log::debug!("{name} returned {} results in {latency:?}", results.len());
                debug::log_response(
                    &self.options.debug,
                    &format!("{name}: {} results", results.len()),
                );
            }
            Err(error) => {
                self.stats.record(name, Outcome::Failure(error), latency);
                log::warn!("provider {error} after {latency:?}");
            }
        }

        outcome
    }
}
