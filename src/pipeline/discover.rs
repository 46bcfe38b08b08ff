// src/pipeline/discover.rs

//! URL discovery pipeline.

use crate::error::{AppError, Result};
use crate::models::DiscoveryConfig;
use crate::services::{Fetcher, IndexPageLinkScraper, SitemapResolver};

/// Discover all manual-page URLs for the configured origin.
///
/// Sitemaps are authoritative; the index-page link scrape only runs when they
/// yield nothing. Finding no URLs through either path is a terminal condition
/// surfaced as `AppError::Discovery`, never a silent empty success.
pub async fn discover_urls(fetcher: &Fetcher, config: &DiscoveryConfig) -> Result<Vec<String>> {
    log::info!("Discovering manual URLs from {}", config.base_url);

    let resolver = SitemapResolver::new(fetcher, config);
    let mut urls = resolver.resolve_manual_urls().await;

    if urls.is_empty() {
        log::info!("Sitemaps yielded nothing, falling back to index page scrape");
        let scraper = IndexPageLinkScraper::new(fetcher, config);
        urls = scraper.scrape_index_links().await;
    }

    if urls.is_empty() {
        return Err(AppError::discovery(format!(
            "no manual URLs found at {}",
            config.base_url
        )));
    }

    if config.limit > 0 && urls.len() > config.limit {
        log::info!("Limiting crawl to first {} of {} URLs", config.limit, urls.len());
        urls.truncate(config.limit);
    }

    Ok(urls)
}
