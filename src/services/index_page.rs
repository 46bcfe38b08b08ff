//! Index-page link scraping fallback.
//!
//! Used only when sitemap resolution yields nothing: fetches the manual index
//! page and pulls same-host manual links out of the raw markup with a regex.
//! Deliberately not a full parser; this is a best-effort fallback path.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::DiscoveryConfig;
use crate::services::Fetcher;
use crate::utils::get_domain;

/// Scrapes manual-page links from the manual index page.
pub struct IndexPageLinkScraper<'a> {
    fetcher: &'a Fetcher,
    config: &'a DiscoveryConfig,
}

impl<'a> IndexPageLinkScraper<'a> {
    pub fn new(fetcher: &'a Fetcher, config: &'a DiscoveryConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch the index page and extract manual links.
    ///
    /// Any fetch failure yields an empty result; the caller decides whether
    /// an empty discovery is fatal.
    pub async fn scrape_index_links(&self) -> Vec<String> {
        let base = self.config.base_url.trim_end_matches('/');
        let index_url = format!("{base}{}", self.config.path_marker);

        let raw = match self.fetcher.fetch(&index_url).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Index page fetch failed for {}: {}", index_url, e);
                return Vec::new();
            }
        };

        let html = String::from_utf8_lossy(&raw);
        let host = get_domain(&self.config.base_url).unwrap_or_default();
        extract_manual_links(&html, &host, &self.config.path_marker)
    }
}

/// Extract absolute same-host links that lead inside the manual path.
///
/// A link must contain the path marker with something after it (the index
/// page itself does not count), and its host must equal `host`. Returns a
/// de-duplicated, lexicographically sorted list.
pub fn extract_manual_links(html: &str, host: &str, path_marker: &str) -> Vec<String> {
    static HREF_RE: OnceLock<Regex> = OnceLock::new();
    let re = HREF_RE.get_or_init(|| {
        Regex::new(r#"href="(https?://[^"]+)""#).expect("hardcoded regex")
    });

    let mut links: BTreeSet<String> = BTreeSet::new();
    for caps in re.captures_iter(html) {
        let Some(url) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Some(marker_pos) = url.find(path_marker) else {
            continue;
        };
        // Require content after the marker; the index page itself is not a
        // manual page.
        if marker_pos + path_marker.len() >= url.len() {
            continue;
        }
        if host.is_empty() || get_domain(url).as_deref() != Some(host) {
            continue;
        }
        links.insert(url.to_string());
    }
    links.into_iter().collect()
}
