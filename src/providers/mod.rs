//! Search provider implementations

pub mod arxiv;
pub mod brave;
pub mod duckduckgo;
pub mod searxng;

// Re-export providers for convenience
pub use arxiv::ArxivProvider;
pub use brave::BraveProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use searxng::SearxNGProvider;
