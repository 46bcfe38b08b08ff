// src/pipeline/crawl.rs

//! Full crawl pipeline: discover, fetch, extract, persist.

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, CrawlStats, ExtractedPage};
use crate::pipeline::discover_urls;
use crate::services::{Fetcher, extract_text, extract_title};
use crate::storage::LocalStorage;

/// Run the crawler end to end.
///
/// Discovery completes fully before any page fetch. Pages are then fetched
/// one at a time with a fixed delay between requests; a URL whose retries are
/// exhausted is logged, counted and skipped without aborting the run.
pub async fn run_crawl(config: &Config, storage: &LocalStorage) -> Result<CrawlStats> {
    let start_time = Utc::now();

    let fetcher = Fetcher::new(&config.crawler)?;
    let urls = discover_urls(&fetcher, &config.discovery).await?;
    log::info!("Discovered {} manual URLs", urls.len());

    storage.write_url_list(&urls).await?;

    let delay = Duration::from_millis(config.crawler.request_delay_ms);
    let total = urls.len();
    let mut records = Vec::new();
    let mut failed = 0usize;

    for (i, url) in urls.iter().enumerate() {
        let raw = match fetcher.fetch(url).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Fetch failed for {}: {}", url, e);
                failed += 1;
                continue;
            }
        };

        let html = String::from_utf8_lossy(&raw);
        let title = extract_title(&html);
        let text = extract_text(&html);
        let page = ExtractedPage {
            url: url.clone(),
            title,
            text,
            raw_html: raw,
        };

        let record = storage.save_page(&page).await?;
        let label = if page.title.is_empty() {
            url.as_str()
        } else {
            page.title.as_str()
        };
        log::info!("[{}/{}] saved: {}", i + 1, total, label);
        records.push(record);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    storage.write_index(&records).await?;

    let stats = CrawlStats {
        start_time,
        end_time: Utc::now(),
        discovered: total,
        fetched: records.len(),
        failed,
    };
    storage.write_stats(&stats).await?;

    log::info!(
        "Crawl finished: {} fetched, {} failed (of {} discovered)",
        stats.fetched,
        stats.failed,
        stats.discovered
    );
    Ok(stats)
}
