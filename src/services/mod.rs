//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Resilient page fetching (`Fetcher`)
//! - Sitemap-based URL discovery (`SitemapResolver`)
//! - Index-page link scraping fallback (`IndexPageLinkScraper`)
//! - Content and title extraction (`extract_text`, `extract_title`)

mod extract;
mod fetcher;
mod index_page;
mod sitemap;

pub use extract::{extract_text, extract_title};
pub use fetcher::Fetcher;
pub use index_page::{IndexPageLinkScraper, extract_manual_links};
pub use sitemap::{SitemapDocument, SitemapResolver, parse_sitemap_document};
