//! Feed classification heuristics
//!
//! Content sniffing decides whether a URL is a feed; URL-pattern scoring
//! only orders URLs that were already confirmed by their content.

use std::cmp::Reverse;
use std::collections::HashSet;

/// Markers whose presence in a body indicates RSS, RDF or Atom content
const FEED_MARKERS: &[&str] = &["<rss", "<rdf", "<feed"];

/// Marker that vetoes feed classification
const HTML_MARKER: &str = "<html";

/// Path suffixes of URLs that name a feed document
const FEED_SUFFIXES: &[&str] = &[".rss", ".rdf", ".xml", ".atom"];

/// Substrings of URLs that merely mention feeds
const FEEDLIKE_KEYWORDS: &[&str] = &["rss", "rdf", "xml", "atom", "feed"];

/// Ranking keywords, highest priority first
const SCORE_KEYWORDS: &[&str] = &["atom", "rss", "rdf", ".xml", "feed"];

/// Count feed markers in a fetched body
///
/// Returns 0 for anything containing `<html`, even if it mentions feed
/// tags in prose or embedded examples. A positive value means the body is
/// classified as feed content.
pub fn is_feed_content(body: &str) -> usize {
    let data = body.to_lowercase();
    if data.contains(HTML_MARKER) {
        return 0;
    }
    FEED_MARKERS
        .iter()
        .map(|marker| data.matches(marker).count())
        .sum()
}

/// True if the URL path ends with a feed file extension
pub fn looks_like_feed_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or("").to_lowercase();
    FEED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// True if the URL mentions a feed keyword anywhere
pub fn is_feedlike_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    FEEDLIKE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Ranking score of a URL string
///
/// Comment feeds score -2 and geographic feeds -1; otherwise the first
/// keyword of `atom`, `rss`, `rdf`, `.xml`, `feed` that occurs scores
/// 5 down to 1, and anything else 0.
pub fn feed_url_score(url: &str) -> i32 {
    if url.contains("comments") {
        return -2;
    }
    if url.contains("georss") {
        return -1;
    }
    SCORE_KEYWORDS
        .iter()
        .position(|kw| url.contains(kw))
        .map(|idx| (SCORE_KEYWORDS.len() - idx) as i32)
        .unwrap_or(0)
}

/// Deduplicate and order confirmed feed URLs
///
/// Uniqueness is exact string equality. The sort is stable, so URLs with
/// equal scores keep the order in which they were first seen.
pub fn rank_feed_urls<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = urls
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect();
    unique.sort_by_key(|url| Reverse(feed_url_score(url)));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_body_is_feed() {
        assert!(is_feed_content("<rss version=\"2.0\">...</rss>") > 0);
        assert!(is_feed_content("<?xml version=\"1.0\"?><feed xmlns=\"http://www.w3.org/2005/Atom\"></feed>") > 0);
        assert!(is_feed_content("<rdf:RDF xmlns:rdf=\"...\"></rdf:RDF>") > 0);
    }

    #[test]
    fn test_html_vetoes_feed() {
        assert_eq!(
            is_feed_content("<html><body>rss rss rss</body></html>"),
            0
        );
        assert_eq!(
            is_feed_content("<HTML><pre>&lt;rss&gt; <rss> <feed></pre></HTML>"),
            0
        );
    }

    #[test]
    fn test_marker_counts_are_combined() {
        let body = "<RSS><channel><item/></channel></RSS><feed/>";
        assert_eq!(is_feed_content(body), 2);
        assert_eq!(is_feed_content("plain text"), 0);
        assert_eq!(is_feed_content(""), 0);
    }

    #[test]
    fn test_looks_like_feed_url() {
        assert!(looks_like_feed_url("/feed.xml"));
        assert!(looks_like_feed_url("news/INDEX.RSS"));
        assert!(looks_like_feed_url("http://x/a.atom"));
        assert!(looks_like_feed_url("a.rdf?format=full"));
        assert!(!looks_like_feed_url("/feed"));
        assert!(!looks_like_feed_url("/xml/page.html"));
    }

    #[test]
    fn test_is_feedlike_url() {
        assert!(is_feedlike_url("/feed"));
        assert!(is_feedlike_url("https://other.com/RSS/news"));
        assert!(is_feedlike_url("/sitemap.xml"));
        assert!(!is_feedlike_url("/about"));
    }

    #[test]
    fn test_score_keyword_priority() {
        assert_eq!(feed_url_score("http://x/atom.xml"), 5);
        assert_eq!(feed_url_score("http://x/rss"), 4);
        assert_eq!(feed_url_score("http://x/index.rdf"), 3);
        assert_eq!(feed_url_score("http://x/index.xml"), 2);
        assert_eq!(feed_url_score("http://x/feed"), 1);
        assert_eq!(feed_url_score("http://x/news"), 0);
        assert!(feed_url_score("http://x/atom.xml") > feed_url_score("http://x/feed"));
    }

    #[test]
    fn test_score_demotions_precede_keywords() {
        assert_eq!(feed_url_score("http://x/comments.xml"), -2);
        assert_eq!(feed_url_score("http://x/comments/feed/atom"), -2);
        assert_eq!(feed_url_score("http://x/georss.xml"), -1);
    }

    #[test]
    fn test_rank_dedups_and_orders() {
        let ranked = rank_feed_urls(vec![
            "http://x/feed".to_string(),
            "http://x/comments.rss".to_string(),
            "http://x/atom.xml".to_string(),
            "http://x/feed".to_string(),
            "http://x/rss".to_string(),
        ]);
        assert_eq!(
            ranked,
            vec![
                "http://x/atom.xml",
                "http://x/rss",
                "http://x/feed",
                "http://x/comments.rss",
            ]
        );
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let ranked = rank_feed_urls(vec![
            "http://x/b.xml".to_string(),
            "http://x/a.xml".to_string(),
            "http://x/c.xml".to_string(),
        ]);
        assert_eq!(ranked, vec!["http://x/b.xml", "http://x/a.xml", "http://x/c.xml"]);
    }

    #[test]
    fn test_rank_is_case_sensitive() {
        let ranked = rank_feed_urls(vec![
            "http://x/Feed.xml".to_string(),
            "http://x/feed.xml".to_string(),
        ]);
        assert_eq!(ranked.len(), 2);
    }
}
