//! Pipeline entry points for crawler operations.
//!
//! - `discover_urls`: Resolve manual-page URLs via sitemaps with an
//!   index-page fallback
//! - `run_crawl`: Full run: discover, fetch, extract, persist

pub mod crawl;
pub mod discover;

pub use crawl::run_crawl;
pub use discover::discover_urls;
