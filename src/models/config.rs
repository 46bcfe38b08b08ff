//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and retry behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// URL discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_retries == 0 {
            return Err(AppError::validation("crawler.max_retries must be > 0"));
        }
        if self.crawler.backoff_base <= 0.0 {
            return Err(AppError::validation("crawler.backoff_base must be > 0"));
        }
        if self.discovery.base_url.trim().is_empty() {
            return Err(AppError::validation("discovery.base_url is empty"));
        }
        if !self.discovery.base_url.starts_with("http://")
            && !self.discovery.base_url.starts_with("https://")
        {
            return Err(AppError::validation(
                "discovery.base_url must start with http:// or https://",
            ));
        }
        if self.discovery.sitemap_paths.is_empty() {
            return Err(AppError::validation("discovery.sitemap_paths is empty"));
        }
        if self.discovery.path_marker.trim().is_empty() {
            return Err(AppError::validation("discovery.path_marker is empty"));
        }
        Ok(())
    }
}

/// HTTP client and retry behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Accept-Encoding header (decoding is handled manually by the fetcher)
    #[serde(default = "defaults::accept_encoding")]
    pub accept_encoding: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Total fetch attempts per URL before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Backoff base in seconds; attempt n sleeps base^n
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base: f64,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            accept_encoding: defaults::accept_encoding(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            backoff_base: defaults::backoff_base(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// URL discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Base origin to crawl (scheme + host)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Well-known sitemap paths, tried in order
    #[serde(default = "defaults::sitemap_paths")]
    pub sitemap_paths: Vec<String>,

    /// Path substring a URL must contain to count as a manual page
    #[serde(default = "defaults::path_marker")]
    pub path_marker: String,

    /// Maximum number of URLs to crawl (0 = unlimited)
    #[serde(default)]
    pub limit: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            sitemap_paths: defaults::sitemap_paths(),
            path_marker: defaults::path_marker(),
            limit: 0,
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
            .into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "ja,en-US;q=0.9,en;q=0.8".into()
    }
    pub fn accept_encoding() -> String {
        "gzip, deflate, br".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn backoff_base() -> f64 {
        1.5
    }
    pub fn request_delay() -> u64 {
        800
    }

    // Discovery defaults
    pub fn base_url() -> String {
        "https://swell-theme.com".into()
    }
    pub fn sitemap_paths() -> Vec<String> {
        vec!["/sitemap_index.xml".into(), "/sitemap.xml".into()]
    }
    pub fn path_marker() -> String {
        "/manual/".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_retries() {
        let mut config = Config::default();
        config.crawler.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.discovery.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [discovery]
            base_url = "https://docs.example.com"
            limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.discovery.base_url, "https://docs.example.com");
        assert_eq!(config.discovery.limit, 10);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.discovery.path_marker, "/manual/");
    }
}
