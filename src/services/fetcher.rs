//! Resilient HTTP fetcher.
//!
//! Performs a single logical GET with browser-identity headers, bounded retry
//! with exponential backoff, and manual gzip decompression. Decoding is not
//! delegated to reqwest: a corrupt gzip body must degrade to the raw bytes
//! instead of failing the whole fetch.

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::{AppError, FetchError, Result};
use crate::models::CrawlerConfig;

/// HTTP fetcher with retry/backoff policy baked in at construction.
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff_base: f64,
}

impl Fetcher {
    /// Create a fetcher from crawler configuration.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("accept", &config.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("accept_language", &config.accept_language)?,
        );
        headers.insert(
            ACCEPT_ENCODING,
            header_value("accept_encoding", &config.accept_encoding)?,
        );

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
        })
    }

    /// Fetch a URL, retrying transient failures with exponential backoff.
    ///
    /// Every attempt failure (connect, timeout, non-2xx status, body read)
    /// sleeps `backoff_base^attempt` seconds, attempt counted from 1. The
    /// sleep happens after the final attempt too, then the last error is
    /// returned to the caller.
    pub async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_fetch(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    log::debug!(
                        "Fetch attempt {}/{} failed for {}: {}",
                        attempt,
                        self.max_retries,
                        url,
                        e
                    );
                    let backoff =
                        Duration::from_secs_f64(self.backoff_base.powi(attempt as i32).max(0.0));
                    tokio::time::sleep(backoff).await;
                    if attempt >= self.max_retries {
                        return Err(e);
                    }
                }
            }
        }
    }

    /// One GET attempt: status check, body read, gzip handling.
    async fn try_fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let gzipped = response
            .headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Http {
                url: url.to_string(),
                source: e,
            })?
            .to_vec();

        if gzipped {
            Ok(decompress_gzip(bytes))
        } else {
            Ok(bytes)
        }
    }
}

/// Decompress a gzip body, passing the raw bytes through when decoding fails.
fn decompress_gzip(bytes: Vec<u8>) -> Vec<u8> {
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut decoded = Vec::new();
    match decoder.read_to_end(&mut decoded) {
        Ok(_) => decoded,
        Err(e) => {
            log::debug!("Gzip decompression failed, passing raw bytes through: {}", e);
            bytes
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::validation(format!("invalid crawler.{name} header value")))
}
