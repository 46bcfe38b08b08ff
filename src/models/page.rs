//! Page and crawl-result domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fetched and text-extracted manual page.
///
/// Constructed once per discovered URL and immediately persisted; the raw
/// markup is kept alongside the flattened text.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Absolute URL the page was fetched from
    pub url: String,

    /// Document title (may be empty)
    pub title: String,

    /// Flattened reading-order text (may be empty)
    pub text: String,

    /// Original response bytes, decompressed if the transport said gzip
    pub raw_html: Vec<u8>,
}

/// Index entry for a persisted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub html_path: String,
    pub text_path: String,
    pub title: String,
}

/// Summary of a crawl run, written next to the index for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub discovered: usize,
    pub fetched: usize,
    pub failed: usize,
}
