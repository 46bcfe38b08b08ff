//! Sitemap-based URL discovery.
//!
//! Tries the well-known sitemap paths in order; each may be a sitemap index
//! (child `<sitemap><loc>` entries, fetched recursively) or a flat sitemap
//! (`<url><loc>` entries). Every failure short of "nothing found anywhere" is
//! non-fatal: a missing or malformed sitemap only skips that source.

use std::collections::{BTreeSet, HashSet};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::models::DiscoveryConfig;
use crate::services::Fetcher;

/// Parsed sitemap file: either child sitemaps or page URLs (or neither).
#[derive(Debug, Default)]
pub struct SitemapDocument {
    /// `<sitemap><loc>` entries of a sitemap index
    pub child_sitemaps: Vec<String>,

    /// `<url><loc>` entries of a flat sitemap
    pub page_urls: Vec<String>,
}

/// Resolves manual-page URLs from a site's XML sitemaps.
pub struct SitemapResolver<'a> {
    fetcher: &'a Fetcher,
    config: &'a DiscoveryConfig,
}

impl<'a> SitemapResolver<'a> {
    pub fn new(fetcher: &'a Fetcher, config: &'a DiscoveryConfig) -> Self {
        Self { fetcher, config }
    }

    /// Collect every sitemap URL containing the path marker.
    ///
    /// Never errors: unusable sitemaps yield an empty result. Child sitemaps
    /// are fetched at most once even when listed repeatedly, and the returned
    /// list is de-duplicated and lexicographically sorted.
    pub async fn resolve_manual_urls(&self) -> Vec<String> {
        let mut found: BTreeSet<String> = BTreeSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let base = self.config.base_url.trim_end_matches('/');

        for sitemap_path in &self.config.sitemap_paths {
            let sitemap_url = format!("{base}{sitemap_path}");
            let raw = match self.fetcher.fetch(&sitemap_url).await {
                Ok(raw) => raw,
                Err(e) if e.is_not_found() => {
                    log::debug!("No sitemap at {}", sitemap_url);
                    continue;
                }
                Err(e) => {
                    log::warn!("Sitemap fetch failed for {}: {}", sitemap_url, e);
                    continue;
                }
            };

            let Some(doc) = parse_sitemap_document(&raw) else {
                log::warn!("Unparseable sitemap at {}", sitemap_url);
                continue;
            };

            if !doc.child_sitemaps.is_empty() {
                // Sitemap index: walk each child once.
                for child_url in doc.child_sitemaps {
                    if child_url.is_empty() || !visited.insert(child_url.clone()) {
                        continue;
                    }
                    let child_doc = match self.fetcher.fetch(&child_url).await {
                        Ok(raw) => parse_sitemap_document(&raw),
                        Err(e) => {
                            log::warn!("Child sitemap fetch failed for {}: {}", child_url, e);
                            continue;
                        }
                    };
                    let Some(child_doc) = child_doc else {
                        log::warn!("Unparseable child sitemap at {}", child_url);
                        continue;
                    };
                    self.collect_manual_urls(&child_doc.page_urls, &mut found);
                }
            } else {
                self.collect_manual_urls(&doc.page_urls, &mut found);
            }
        }

        found.into_iter().collect()
    }

    fn collect_manual_urls(&self, urls: &[String], found: &mut BTreeSet<String>) {
        for url in urls {
            if url.contains(&self.config.path_marker) {
                found.insert(url.clone());
            }
        }
    }
}

/// Parse sitemap XML into its `<sitemap><loc>` and `<url><loc>` entries.
///
/// Element matching ignores XML namespaces. Returns `None` for markup the XML
/// reader rejects; a well-formed document with no recognizable entries parses
/// to an empty `SitemapDocument`.
pub fn parse_sitemap_document(raw: &[u8]) -> Option<SitemapDocument> {
    let xml = String::from_utf8_lossy(raw);
    let mut reader = Reader::from_str(&xml);
    let mut doc = SitemapDocument::default();
    let mut in_sitemap = false;
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap = true,
                b"url" => in_url = true,
                b"loc" => in_loc = in_sitemap || in_url,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                if let Ok(text) = e.unescape() {
                    let loc = text.trim().to_string();
                    if !loc.is_empty() {
                        if in_sitemap {
                            doc.child_sitemaps.push(loc);
                        } else {
                            doc.page_urls.push(loc);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sitemap" => in_sitemap = false,
                b"url" => in_url = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flat_sitemap() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/manual/a/</loc></url>
              <url><loc>https://example.com/blog/b/</loc></url>
            </urlset>"#;
        let doc = parse_sitemap_document(xml).unwrap();
        assert!(doc.child_sitemaps.is_empty());
        assert_eq!(
            doc.page_urls,
            vec![
                "https://example.com/manual/a/".to_string(),
                "https://example.com/blog/b/".to_string(),
            ]
        );
    }

    #[test]
    fn parse_sitemap_index() {
        let xml = br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sitemap><loc>https://example.com/page-sitemap.xml</loc></sitemap>
              <sitemap><loc>https://example.com/post-sitemap.xml</loc></sitemap>
            </sitemapindex>"#;
        let doc = parse_sitemap_document(xml).unwrap();
        assert_eq!(doc.child_sitemaps.len(), 2);
        assert!(doc.page_urls.is_empty());
    }

    #[test]
    fn parse_ignores_namespace_prefixes() {
        let xml = br#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sm:url><sm:loc>https://example.com/manual/x/</sm:loc></sm:url>
            </sm:urlset>"#;
        let doc = parse_sitemap_document(xml).unwrap();
        assert_eq!(doc.page_urls, vec!["https://example.com/manual/x/".to_string()]);
    }

    #[test]
    fn parse_rejects_malformed_xml() {
        assert!(parse_sitemap_document(b"<urlset><url><loc>x</url></urlset").is_none());
    }

    #[test]
    fn parse_accepts_unrelated_document_as_empty() {
        let doc = parse_sitemap_document(b"<feed><entry>hi</entry></feed>").unwrap();
        assert!(doc.child_sitemaps.is_empty());
        assert!(doc.page_urls.is_empty());
    }

    #[test]
    fn loc_outside_sitemap_or_url_is_ignored() {
        let doc = parse_sitemap_document(b"<root><loc>https://example.com/manual/</loc></root>")
            .unwrap();
        assert!(doc.page_urls.is_empty());
    }
}
