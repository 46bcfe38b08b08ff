// src/models/mod.rs

//! Domain models for the crawler application.

mod config;
mod page;

// Re-export all public types
pub use config::{Config, CrawlerConfig, DiscoveryConfig};
pub use page::{CrawlStats, ExtractedPage, PageRecord};
