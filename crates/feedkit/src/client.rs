//! Entry points for FeedKit
//!
//! This module provides the one-call functions for discovering feeds and
//! crawling a site. The cascade itself lives in [`discover`](crate::discover);
//! the HTTP side in [`fetchers`](crate::fetchers).

use crate::crawl::{CrawlOptions, Crawler};
use crate::discover::{Discoverer, DiscoveryOptions};
use crate::error::{FeedError, FetchError};
use crate::fetchers::{HttpFetcher, RetryPolicy};
use crate::markup::HtmlMarkup;
use crate::normalize::normalize;
use crate::types::CrawlResponse;
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default response size limit (5MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Options for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
    /// Total time allowed for one request, body included
    pub timeout: Duration,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Largest body accepted, in bytes
    pub max_body_size: usize,
    /// Retry behaviour on connect/TLS failures
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            retry: RetryPolicy::Never,
        }
    }
}

/// Discover the feeds of a site with default options
///
/// Accepts anything a user might type (`zeit.de`, `feed://…`, a full URL)
/// and returns the confirmed feed URLs, most likely first. An unreachable
/// site or a site without feeds yields an empty list.
pub async fn discover(site: &str) -> Result<Vec<String>, FetchError> {
    discover_with_options(site, FetchOptions::default(), DiscoveryOptions::default()).await
}

/// Discover the feeds of a site with custom options
///
/// Only fails if the HTTP client cannot be built.
pub async fn discover_with_options(
    site: &str,
    fetch_options: FetchOptions,
    options: DiscoveryOptions,
) -> Result<Vec<String>, FetchError> {
    let fetcher = HttpFetcher::new(fetch_options)?;
    let discoverer = Discoverer::new(Arc::new(fetcher), Arc::new(HtmlMarkup::new()))
        .with_options(options);
    Ok(discoverer.discover(&normalize(site)).await)
}

/// Discover a site's feed and ingest its entries with default options
pub async fn crawl(site: &str) -> Result<CrawlResponse, FeedError> {
    crawl_with_options(site, FetchOptions::default(), CrawlOptions::default()).await
}

/// Discover a site's feed and ingest its entries with custom options
pub async fn crawl_with_options(
    site: &str,
    fetch_options: FetchOptions,
    options: CrawlOptions,
) -> Result<CrawlResponse, FeedError> {
    let fetcher = Arc::new(HttpFetcher::new(fetch_options)?);
    let discoverer = Discoverer::new(fetcher.clone(), Arc::new(HtmlMarkup::new()));
    Crawler::new(discoverer, fetcher)
        .with_options(options)
        .crawl(site)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert!(options.user_agent.is_none());
        assert!(options.allow_prefixes.is_empty());
        assert!(options.block_prefixes.is_empty());
        assert_eq!(options.timeout, DEFAULT_TIMEOUT);
        assert_eq!(options.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(options.retry, RetryPolicy::Never);
    }

    #[tokio::test]
    async fn test_discover_unreachable_site_is_empty() {
        let options = FetchOptions {
            timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_millis(500),
            ..Default::default()
        };
        // Port 9 (discard) is closed on test hosts; the seed fetch fails fast.
        let feeds = discover_with_options("http://127.0.0.1:9", options, DiscoveryOptions::default())
            .await
            .unwrap();
        assert!(feeds.is_empty());
    }

    #[tokio::test]
    async fn test_crawl_empty_site_is_error() {
        let result = crawl("").await;
        assert!(matches!(result, Err(FeedError::MissingUrl)));
    }
}
