// src/lib.rs

//! Manual Crawler Library
//!
//! Discovers documentation pages under a site's `/manual/` path via XML
//! sitemaps (with an index-page link-scrape fallback), fetches each page with
//! bounded retry, and flattens the main content region into plain text.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
