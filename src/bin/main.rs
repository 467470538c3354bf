//! multisearch CLI - query one or several search providers from the terminal
//!
//! Providers: DuckDuckGo, Brave, SearXNG and ArXiv.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use multisearch::{
    multi_provider::{MultiProviderConfig, MultiProviderSearch, MultiProviderStrategy},
    providers::*,
    types::{SafeSearch, SearchOptions, SearchProvider, SortBy, SortOrder},
    utils::debug,
    classify, troubleshooting, web_search, SearchError, SearchResult,
};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "multisearch")]
#[command(about = "Multi-provider web search CLI")]
#[command(version)]
struct Cli {
    /// Enable debug output (request/response logging)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Commands,
}

/// Provider credentials, read from the environment when not given as flags
#[derive(Args, Clone, Debug)]
struct Credentials {
    /// Brave Search API key
    #[arg(long, env = "BRAVE_API_KEY", hide_env_values = true, global = true)]
    brave_api_key: Option<String>,

    /// SearXNG instance URL
    #[arg(long, env = "SEARXNG_URL", global = true)]
    searxng_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search using a single provider
    Single {
        /// Search query
        query: String,

        /// Search provider
        #[arg(short, long, value_enum)]
        provider: Provider,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        max_results: u32,

        /// Language code (e.g., en, es, fr)
        #[arg(short, long)]
        language: Option<String>,

        /// Region code (e.g., US, UK, DE)
        #[arg(short, long)]
        region: Option<String>,

        /// Safe search setting
        #[arg(short, long, value_enum)]
        safe_search: Option<SafeSearchCli>,

        /// Overall timeout in milliseconds
        #[arg(short, long, default_value = "15000")]
        timeout: u64,

        /// Show raw provider response
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Search using multiple providers
    Multi {
        /// Search query
        query: String,

        /// Multi-provider strategy (aggregate, failover, load-balance, race)
        #[arg(short, long, default_value = "aggregate")]
        strategy: MultiProviderStrategy,

        /// Providers to use (if not specified, uses available providers)
        #[arg(short, long, value_enum)]
        providers: Vec<Provider>,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        max_results: u32,

        /// Overall deadline in milliseconds
        #[arg(short, long, default_value = "15000")]
        timeout: u64,

        /// Per-provider timeout in milliseconds
        #[arg(long, default_value = "10000")]
        provider_timeout: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Show provider statistics
        #[arg(long)]
        stats: bool,
    },
    /// Search ArXiv papers by ID
    Arxiv {
        /// Comma-separated ArXiv IDs (e.g., "1234.5678,2345.6789")
        ids: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        max_results: u32,

        /// Sort by field
        #[arg(long, value_enum)]
        sort_by: Option<SortByCli>,

        /// Sort order
        #[arg(long, value_enum)]
        sort_order: Option<SortOrderCli>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List available providers and their status
    Providers,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Provider {
    Duckduckgo,
    Brave,
    Searxng,
    Arxiv,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SafeSearchCli {
    Off,
    Moderate,
    Strict,
}

impl From<SafeSearchCli> for SafeSearch {
    fn from(value: SafeSearchCli) -> Self {
        match value {
            SafeSearchCli::Off => SafeSearch::Off,
            SafeSearchCli::Moderate => SafeSearch::Moderate,
            SafeSearchCli::Strict => SafeSearch::Strict,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortByCli {
    Relevance,
    SubmittedDate,
    LastUpdatedDate,
}

impl From<SortByCli> for SortBy {
    fn from(value: SortByCli) -> Self {
        match value {
            SortByCli::Relevance => SortBy::Relevance,
            SortByCli::SubmittedDate => SortBy::SubmittedDate,
            SortByCli::LastUpdatedDate => SortBy::LastUpdatedDate,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortOrderCli {
    Ascending,
    Descending,
}

impl From<SortOrderCli> for SortOrder {
    fn from(value: SortOrderCli) -> Self {
        match value {
            SortOrderCli::Ascending => SortOrder::Ascending,
            SortOrderCli::Descending => SortOrder::Descending,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Simple,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "multisearch=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let debug = cli.debug.then(debug::debug_all);

    match cli.command {
        Commands::Single {
            query,
            provider,
            max_results,
            language,
            region,
            safe_search,
            timeout,
            raw,
            format,
        } => {
            let options = SearchOptions {
                query,
                max_results: Some(max_results),
                language,
                region,
                safe_search: safe_search.map(Into::into),
                timeout: Some(timeout),
                debug,
                ..Default::default()
            };
            handle_single_search(&cli.credentials, provider, options, raw, format).await
        }
        Commands::Multi {
            query,
            strategy,
            providers,
            max_results,
            timeout,
            provider_timeout,
            format,
            stats,
        } => {
            let options = SearchOptions {
                query,
                max_results: Some(max_results),
                timeout: Some(timeout),
                debug,
                ..Default::default()
            };
            let config = MultiProviderConfig::new(strategy)
                .with_max_results(max_results as usize)
                .with_timeout(Duration::from_millis(provider_timeout));
            handle_multi_search(&cli.credentials, config, providers, options, format, stats).await
        }
        Commands::Arxiv {
            ids,
            max_results,
            sort_by,
            sort_order,
            format,
        } => {
            let options = SearchOptions {
                id_list: Some(ids),
                max_results: Some(max_results),
                sort_by: sort_by.map(Into::into),
                sort_order: sort_order.map(Into::into),
                debug,
                ..Default::default()
            };
            let results = web_search(&ArxivProvider::new(), &options)
                .await
                .map_err(|err| with_hint("arxiv", err))?;
            display_results(&results, format, false, Some("arxiv"))
        }
        Commands::Providers => {
            handle_list_providers(&cli.credentials);
            Ok(())
        }
    }
}

async fn handle_single_search(
    credentials: &Credentials,
    provider: Provider,
    options: SearchOptions,
    raw: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let provider = create_provider(credentials, provider)?;
    let results = web_search(provider.as_ref(), &options)
        .await
        .map_err(|err| with_hint(provider.name(), err))?;
    display_results(&results, format, raw, Some(provider.name()))
}

/// Attach the troubleshooting hint for a failed single-provider call
fn with_hint(provider: &str, err: SearchError) -> anyhow::Error {
    let hint = troubleshooting(&classify(provider, &err));
    anyhow::Error::new(err).context(hint)
}

async fn handle_multi_search(
    credentials: &Credentials,
    mut config: MultiProviderConfig,
    providers: Vec<Provider>,
    options: SearchOptions,
    format: OutputFormat,
    stats: bool,
) -> anyhow::Result<()> {
    let requested = if providers.is_empty() {
        available_providers(credentials)
    } else {
        providers
    };

    for provider in requested {
        match create_provider(credentials, provider) {
            Ok(instance) => config = config.add_provider(instance),
            Err(err) => log::warn!("skipping {provider:?}: {err:#}"),
        }
    }

    let multi_search = MultiProviderSearch::with_config(config)?;
    let outcome = multi_search.search(&options).await;

    if stats {
        display_provider_stats(&multi_search);
    }

    match outcome {
        Ok(results) => display_results(&results, format, false, None),
        Err(error) => {
            display_failures(&error);
            Err(error.into())
        }
    }
}

fn handle_list_providers(credentials: &Credentials) {
    println!("{}", "Available Search Providers:".bold().blue());
    println!();

    let providers = [
        ("DuckDuckGo", "No API key required", true),
        ("Brave", "Requires BRAVE_API_KEY", credentials.brave_api_key.is_some()),
        ("SearXNG", "Requires SEARXNG_URL", credentials.searxng_url.is_some()),
        ("ArXiv", "No API key required", true),
    ];

    for (name, requirement, available) in providers {
        let status = if available { "✅".green() } else { "❌".red() };
        println!("{} {} - {}", status, name.bold(), requirement.italic());
    }

    println!();
    println!("{}", "Set environment variables to enable providers:".bold());
    println!("export BRAVE_API_KEY=your_key");
    println!("export SEARXNG_URL=https://your-searxng-instance.com");
}

fn create_provider(
    credentials: &Credentials,
    provider: Provider,
) -> anyhow::Result<Box<dyn SearchProvider>> {
    let instance: Box<dyn SearchProvider> = match provider {
        Provider::Duckduckgo => Box::new(DuckDuckGoProvider::new()),
        Provider::Brave => {
            let api_key = credentials
                .brave_api_key
                .as_deref()
                .context("BRAVE_API_KEY is not set")?;
            Box::new(BraveProvider::new(api_key)?)
        }
        Provider::Searxng => {
            let url = credentials
                .searxng_url
                .as_deref()
                .context("SEARXNG_URL is not set")?;
            Box::new(SearxNGProvider::new(url)?)
        }
        Provider::Arxiv => Box::new(ArxivProvider::new()),
    };
    Ok(instance)
}

fn available_providers(credentials: &Credentials) -> Vec<Provider> {
    let mut available = vec![Provider::Duckduckgo];
    if credentials.brave_api_key.is_some() {
        available.push(Provider::Brave);
    }
    if credentials.searxng_url.is_some() {
        available.push(Provider::Searxng);
    }
    available.push(Provider::Arxiv);
    available
}

fn display_results(
    results: &[SearchResult],
    format: OutputFormat,
    show_raw: bool,
    provider: Option<&str>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Simple => {
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   {}", result.url);
                if let Some(snippet) = &result.snippet {
                    println!("   {snippet}");
                }
                println!();
            }
        }
        OutputFormat::Table => {
            match provider {
                Some(provider) => {
                    println!("{} {}", "Search Results from".bold(), provider.bold().blue())
                }
                None => println!("{}", "Search Results".bold().blue()),
            }
            println!("{}", "─".repeat(80).dimmed());

            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", (i + 1).to_string().bold(), result.title.bold());
                println!("   🔗 {}", result.url.blue().underline());

                if let Some(domain) = &result.domain {
                    println!("   🌐 {}", domain.green());
                }

                if let Some(snippet) = &result.snippet {
                    println!("   📄 {}", truncate(snippet, 200).italic());
                }

                if let Some(published_date) = &result.published_date {
                    println!("   📅 {}", published_date.yellow());
                }

                if let Some(provider) = &result.provider {
                    println!("   🔍 Provider: {}", provider.cyan());
                }

                if show_raw {
                    if let Some(raw) = &result.raw {
                        println!("   📊 Raw: {}", serde_json::to_string_pretty(raw)?);
                    }
                }

                println!();
            }

            println!("{} {}", "Total results:".bold(), results.len().to_string().bold());
        }
    }
    Ok(())
}

fn display_failures(error: &SearchError) {
    let Some(multi) = error.as_multi() else {
        return;
    };

    eprintln!("{}", "Every provider failed:".bold().red());
    for failure in multi.failures() {
        eprintln!(
            "  {} ({}): {}",
            failure.provider.bold(),
            failure.kind.to_string().yellow(),
            failure.message
        );
        eprintln!("    {}", failure.kind.hint().dimmed());
    }
    eprintln!();
}

fn display_provider_stats(multi_search: &MultiProviderSearch) {
    let stats = multi_search.stats();

    println!();
    println!("{}", "Provider Statistics:".bold().blue());
    println!("{}", "─".repeat(80).dimmed());

    for name in multi_search.provider_names() {
        let Some(stat) = stats.get(name) else {
            continue;
        };

        println!("{}:", name.bold());
        println!("  Total calls: {}", stat.total_calls);
        println!("  Successful: {}", stat.successes.to_string().green());
        println!("  Failed: {}", stat.failures.to_string().red());
        if let Some(avg) = stat.avg_latency() {
            println!("  Avg latency: {:.2}ms", avg.as_secs_f64() * 1000.0);
        }
        if let Some(rate) = stat.success_rate() {
            println!("  Success rate: {:.1}%", rate * 100.0);
        }
        if let Some(error) = &stat.last_error {
            println!("  Last error: {}", error.to_string().red());
        }
        println!();
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
