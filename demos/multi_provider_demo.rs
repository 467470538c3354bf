//! Runs one query through every multi-provider strategy and prints the
//! per-provider statistics each run leaves behind.
//!
//! DuckDuckGo and ArXiv need no credentials. Set `BRAVE_API_KEY` and/or
//! `SEARXNG_URL` to add those providers.
//!
//! ```sh
//! RUST_LOG=multisearch=debug cargo run --example multi_provider_demo -- "rust async"
//! ```

use multisearch::{
    providers::{ArxivProvider, BraveProvider, DuckDuckGoProvider, SearxNGProvider},
    MultiProviderConfig, MultiProviderSearch, MultiProviderStrategy, SearchOptions,
    SearchProvider,
};
use std::env;
use tokio::time::{Duration, Instant};

fn providers() -> Result<Vec<Box<dyn SearchProvider>>, Box<dyn std::error::Error>> {
    let mut providers: Vec<Box<dyn SearchProvider>> = vec![
        Box::new(DuckDuckGoProvider::new()),
        Box::new(ArxivProvider::new()),
    ];
    if let Ok(key) = env::var("BRAVE_API_KEY") {
        providers.push(Box::new(BraveProvider::new(&key)?));
    }
    if let Ok(url) = env::var("SEARXNG_URL") {
        providers.push(Box::new(SearxNGProvider::new(&url)?));
    }
    Ok(providers)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let query = env::args()
        .nth(1)
        .unwrap_or_else(|| "rust programming language".to_string());

    println!("🔍 Multi-Provider Strategy Demo");
    println!("===============================");
    println!("Query: {query}\n");

    for strategy in [
        MultiProviderStrategy::Aggregate,
        MultiProviderStrategy::Failover,
        MultiProviderStrategy::LoadBalance,
        MultiProviderStrategy::Race,
    ] {
        let mut config = MultiProviderConfig::new(strategy)
            .with_timeout(Duration::from_secs(8))
            .with_default_deadline(Duration::from_secs(12))
            .with_max_results(5);
        for provider in providers()? {
            config = config.add_provider(provider);
        }
        let search = MultiProviderSearch::with_config(config)?;

        println!("▶ {strategy} over [{}]", search.provider_names().join(", "));

        let options = SearchOptions {
            max_results: Some(5),
            ..SearchOptions::new(query.as_str())
        };

        // Two rounds so load-balance visibly rotates its starting provider
        for round in 1..=2 {
            let start = Instant::now();
            match search.search(&options).await {
                Ok(results) => {
                    println!(
                        "  round {round}: {} results in {:?}",
                        results.len(),
                        start.elapsed()
                    );
                    for result in results.iter().take(3) {
                        println!(
                            "    - [{}] {}",
                            result.provider.as_deref().unwrap_or("?"),
                            result.title
                        );
                    }
                }
                Err(error) => {
                    println!("  round {round}: failed after {:?}", start.elapsed());
                    match error.as_multi() {
                        Some(multi) => {
                            for failure in multi.failures() {
                                println!("    ✗ {failure}");
                            }
                        }
                        None => println!("    ✗ {error}"),
                    }
                }
            }
        }

        let stats = search.stats();
        for name in search.provider_names() {
            let Some(entry) = stats.get(name) else {
                continue;
            };
            println!(
                "  📊 {name}: calls {} ok {} failed {} success {} avg {}",
                entry.total_calls,
                entry.successes,
                entry.failures,
                entry
                    .success_rate()
                    .map(|rate| format!("{:.0}%", rate * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
                entry
                    .avg_latency()
                    .map(|latency| format!("{latency:?}"))
                    .unwrap_or_else(|| "-".to_string()),
            );
            if let Some(error) = &entry.last_error {
                println!("     last error: {} ({})", error.message, error.kind);
            }
        }
        println!();
    }

    Ok(())
}
