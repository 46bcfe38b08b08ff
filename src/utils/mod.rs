//! Utility functions and helpers.

pub mod fs;

use url::Url;

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Last non-empty path segment of a URL, if any.
pub fn last_path_segment(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://example.com/path"),
            Some("example.com".to_string())
        );
        assert_eq!(
            get_domain("https://sub.example.com:8080/path"),
            Some("sub.example.com".to_string())
        );
        assert_eq!(get_domain("not a url"), None);
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(
            last_path_segment("https://example.com/manual/setup-guide/"),
            Some("setup-guide".to_string())
        );
        assert_eq!(
            last_path_segment("https://example.com/manual/page.html"),
            Some("page.html".to_string())
        );
        assert_eq!(last_path_segment("https://example.com/"), None);
    }
}
