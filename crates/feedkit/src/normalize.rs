//! Site address normalization

use std::fmt;

/// Scheme prepended to bare host names
const DEFAULT_SCHEME: &str = "https://";

/// Pseudo-scheme some browsers and sites use for subscription links
const FEED_SCHEME: &str = "feed://";

/// Absolute site URL produced by [`normalize`]
///
/// Always starts with `http://` or `https://`. Reachability is not checked
/// here; a site that cannot be fetched simply yields no feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteUrl(String);

impl SiteUrl {
    /// The normalized URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a [`url::Url`] for resolving relative references
    pub fn to_url(&self) -> Option<url::Url> {
        url::Url::parse(&self.0).ok()
    }

    /// Consume into the underlying string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a user-entered site string
///
/// - surrounding whitespace is trimmed
/// - `feed://host/path` becomes `http://host/path`
/// - `http://` and `https://` URLs pass through unchanged
/// - anything else gets `https://` prepended
pub fn normalize(raw: &str) -> SiteUrl {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix(FEED_SCHEME) {
        return SiteUrl(format!("http://{}", rest));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return SiteUrl(trimmed.to_string());
    }

    SiteUrl(format!("{}{}", DEFAULT_SCHEME, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        assert_eq!(normalize("zeit.de").as_str(), "https://zeit.de");
        assert!(normalize("spiegel.de/politik").as_str().starts_with("https://"));
    }

    #[test]
    fn test_feed_scheme_rewritten() {
        assert_eq!(
            normalize("feed://example.com/f.xml").as_str(),
            "http://example.com/f.xml"
        );
    }

    #[test]
    fn test_existing_scheme_passes_through() {
        assert_eq!(normalize("http://example.com").as_str(), "http://example.com");
        assert_eq!(
            normalize("https://example.com/news/").as_str(),
            "https://example.com/news/"
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize("  faz.net \n").as_str(), "https://faz.net");
        assert_eq!(
            normalize("\thttp://example.com  ").as_str(),
            "http://example.com"
        );
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "http://example.com",
            "https://example.com/a?b=c",
            "feed://example.com/rss",
            "example.com",
        ] {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {raw}");
        }
    }

    #[test]
    fn test_to_url() {
        let site = normalize("example.com/blog/");
        let url = site.to_url().unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/blog/");
    }
}
