//! Article ingestion
//!
//! Crawling discovers a site's main feed, parses it with `feed-rs` and
//! fetches the page behind every entry to extract its text. A page that
//! cannot be fetched keeps the entry, just without text.

use crate::convert::{fragment_to_text, html_to_text};
use crate::discover::{Discoverer, DEFAULT_CONCURRENCY};
use crate::error::{FeedError, FetchError};
use crate::fetchers::{Page, PageFetcher};
use crate::normalize::{normalize, SiteUrl};
use crate::types::{Article, CrawlResponse};
use feed_rs::model::Entry;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Crawl tuning
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Ingest at most this many entries, in feed order
    pub max_articles: Option<usize>,
    /// Article pages fetched concurrently
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_articles: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Discovers a site's feed and ingests its entries
pub struct Crawler {
    discoverer: Discoverer,
    fetcher: Arc<dyn PageFetcher>,
    options: CrawlOptions,
}

impl Crawler {
    /// Create a crawler fetching feeds and articles through `fetcher`
    pub fn new(discoverer: Discoverer, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            discoverer,
            fetcher,
            options: CrawlOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    /// Discoverer used to find the feed
    pub fn discoverer(&self) -> &Discoverer {
        &self.discoverer
    }

    /// Crawl the highest-ranked feed of `site`
    pub async fn crawl(&self, site: &str) -> Result<CrawlResponse, FeedError> {
        if site.trim().is_empty() {
            return Err(FeedError::MissingUrl);
        }

        let site = normalize(site);
        let feeds = self.discoverer.discover(&site).await;
        let Some(feed) = feeds.into_iter().next() else {
            return Err(FeedError::NoFeedFound {
                site: site.into_string(),
            });
        };

        self.crawl_feed(&site, &feed).await
    }

    /// Ingest the entries of a known feed
    pub async fn crawl_feed(
        &self,
        site: &SiteUrl,
        feed_url: &str,
    ) -> Result<CrawlResponse, FeedError> {
        let page = self.fetch(feed_url).await?;
        let feed = feed_rs::parser::parse(page.feed_bytes().as_ref())
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        let limit = self.options.max_articles.unwrap_or(usize::MAX);
        info!(
            feed = %feed_url,
            entries = feed.entries.len(),
            limit = self.options.max_articles,
            "Crawling feed"
        );

        let base = Url::parse(feed_url).ok();
        let articles: Vec<Article> = stream::iter(feed.entries.into_iter().take(limit))
            .map(|entry| self.ingest(article_from_entry(entry, base.as_ref())))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        Ok(CrawlResponse {
            site: site.to_string(),
            feed: feed_url.to_string(),
            title: feed.title.map(|t| t.content),
            articles,
        })
    }

    async fn ingest(&self, mut article: Article) -> Article {
        let Some(link) = article.link.as_deref() else {
            return article;
        };

        match self.fetch(link).await {
            Ok(page) => {
                let text = html_to_text(&page.text());
                debug!(url = %link, chars = text.len(), "Extracted article text");
                article.text = Some(text).filter(|t| !t.is_empty());
            }
            Err(err) => {
                warn!(url = %link, error = %err, "Error while getting article");
            }
        }
        article
    }

    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let timeout = self.discoverer.options().timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch_raw(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }
}

/// Map a parsed feed entry to an article without text
fn article_from_entry(entry: Entry, base: Option<&Url>) -> Article {
    let link = entry
        .links
        .iter()
        .find(|link| link.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|link| match base.and_then(|base| base.join(&link.href).ok()) {
            Some(url) => url.to_string(),
            None => link.href.clone(),
        });

    let author = join_non_empty(entry.authors.iter().map(|p| p.name.as_str()));
    let tags = join_non_empty(entry.categories.iter().map(|c| c.term.as_str()));

    Article {
        title: entry.title.map(|t| t.content.trim().to_string()),
        summary: entry
            .summary
            .map(|s| fragment_to_text(&s.content))
            .filter(|s| !s.is_empty()),
        author,
        published: entry.published.or(entry.updated).map(|d| d.timestamp()),
        link,
        tags,
        text: None,
    }
}

fn join_non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> Option<String> {
    let parts: Vec<&str> = parts.map(str::trim).filter(|p| !p.is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::HtmlMarkup;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Site News</title>
    <link>http://site/</link>
    <item>
      <title>First story</title>
      <link>http://site/articles/1</link>
      <description>&lt;p&gt;Short &lt;b&gt;summary&lt;/b&gt;&lt;/p&gt;</description>
      <dc:creator>Jane Doe</dc:creator>
      <category>Politics</category>
      <category>World</category>
      <pubDate>Tue, 14 Nov 2023 22:13:20 GMT</pubDate>
    </item>
    <item>
      <title>Second story</title>
      <link>/articles/2</link>
    </item>
    <item>
      <title>Third story</title>
      <link>http://site/articles/3</link>
    </item>
  </channel>
</rss>"#;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        fn name(&self) -> &'static str {
            "map"
        }

        async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
            self.0.get(url).cloned().ok_or(FetchError::HttpStatus(404))
        }
    }

    fn crawler(pages: &[(&str, &str)]) -> Crawler {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(MapFetcher(
            pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
        ));
        let discoverer = Discoverer::new(fetcher.clone(), Arc::new(HtmlMarkup::new()));
        Crawler::new(discoverer, fetcher)
    }

    #[tokio::test]
    async fn test_crawl_site_is_feed() {
        let crawler = crawler(&[
            ("http://site", FEED),
            (
                "http://site/articles/1",
                "<html><body><article><p>Full text one.</p></article></body></html>",
            ),
            ("http://site/articles/2", "<html><body><p>Two</p></body></html>"),
        ]);

        let resp = crawler.crawl("http://site").await.unwrap();
        assert_eq!(resp.site, "http://site");
        assert_eq!(resp.feed, "http://site");
        assert_eq!(resp.title.as_deref(), Some("Site News"));
        assert_eq!(resp.articles.len(), 3);

        let first = &resp.articles[0];
        assert_eq!(first.title.as_deref(), Some("First story"));
        assert_eq!(first.summary.as_deref(), Some("Short summary"));
        assert_eq!(first.author.as_deref(), Some("Jane Doe"));
        assert_eq!(first.tags.as_deref(), Some("Politics, World"));
        assert_eq!(first.published, Some(1_700_000_000));
        assert_eq!(first.text.as_deref(), Some("Full text one."));

        // relative links resolve against the feed URL
        assert_eq!(
            resp.articles[1].link.as_deref(),
            Some("http://site/articles/2")
        );
        assert_eq!(resp.articles[1].text.as_deref(), Some("Two"));

        // unreachable article keeps its metadata
        assert_eq!(resp.articles[2].title.as_deref(), Some("Third story"));
        assert_eq!(resp.articles[2].text, None);
    }

    #[tokio::test]
    async fn test_crawl_respects_max_articles() {
        let crawler = crawler(&[("http://site", FEED)]).with_options(CrawlOptions {
            max_articles: Some(1),
            ..Default::default()
        });
        let resp = crawler.crawl("http://site").await.unwrap();
        assert_eq!(resp.articles.len(), 1);
        assert_eq!(resp.articles[0].title.as_deref(), Some("First story"));
    }

    #[tokio::test]
    async fn test_crawl_no_feed_found() {
        let crawler = crawler(&[("http://site", "<html><body>nothing</body></html>")]);
        match crawler.crawl("http://site").await {
            Err(FeedError::NoFeedFound { site }) => assert_eq!(site, "http://site"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_crawl_missing_url() {
        let crawler = crawler(&[]);
        assert!(matches!(
            crawler.crawl("   ").await,
            Err(FeedError::MissingUrl)
        ));
    }

    #[tokio::test]
    async fn test_crawl_feed_parse_error() {
        let crawler = crawler(&[("http://site/feed", "<html><body>Not a feed</body></html>")]);
        let result = crawler
            .crawl_feed(&normalize("http://site"), "http://site/feed")
            .await;
        assert!(matches!(result, Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_join_non_empty() {
        assert_eq!(
            join_non_empty(["a", " ", "b "].into_iter()).as_deref(),
            Some("a, b")
        );
        assert_eq!(join_non_empty(std::iter::empty()), None);
    }
}
