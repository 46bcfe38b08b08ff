//! Local filesystem storage implementation.
//!
//! Writes per-page HTML and text files plus the run-level index files. All
//! writes go through an atomic temp-file-then-rename path.

use std::path::PathBuf;

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{CrawlStats, ExtractedPage, PageRecord};
use crate::utils;
use crate::utils::fs::sanitize_segment;

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Persist one page as `{name}.html` (raw markup) and `{name}.txt`
    /// (extracted text), returning the index record.
    pub async fn save_page(&self, page: &ExtractedPage) -> Result<PageRecord> {
        let name = page_file_name(page);
        let html_key = format!("{name}.html");
        let text_key = format!("{name}.txt");

        self.write_bytes(&html_key, &page.raw_html).await?;
        self.write_bytes(&text_key, page.text.as_bytes()).await?;

        Ok(PageRecord {
            url: page.url.clone(),
            html_path: self.path(&html_key).display().to_string(),
            text_path: self.path(&text_key).display().to_string(),
            title: page.title.clone(),
        })
    }

    /// Write the discovered URL list, one per line.
    pub async fn write_url_list(&self, urls: &[String]) -> Result<()> {
        let mut content = urls.join("\n");
        content.push('\n');
        self.write_bytes("urls.txt", content.as_bytes()).await
    }

    /// Write the page index.
    pub async fn write_index(&self, records: &[PageRecord]) -> Result<()> {
        self.write_json("index.json", records).await
    }

    /// Write run statistics.
    pub async fn write_stats(&self, stats: &CrawlStats) -> Result<()> {
        self.write_json("stats.json", stats).await
    }
}

/// Derive the base file name for a page: sanitized title, else the last URL
/// path segment, else "manual".
fn page_file_name(page: &ExtractedPage) -> String {
    let source = if !page.title.trim().is_empty() {
        page.title.clone()
    } else {
        utils::last_path_segment(&page.url).unwrap_or_else(|| "manual".to_string())
    };
    sanitize_segment(&source, 80)
}
