//! Page fetchers
//!
//! Design: discovery and crawling only need "give me the body of this URL,
//! or tell me it failed". Anything that can answer that implements
//! [`PageFetcher`]; the HTTP implementation is [`HttpFetcher`].

mod http;
mod page;

pub use http::HttpFetcher;
pub use page::Page;

use crate::error::FetchError;
use async_trait::async_trait;

/// Trait for page fetchers
///
/// Ordinary network failures (timeouts, DNS, TLS, non-2xx statuses) must
/// come back as `Err`, never as a panic.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the textual body of `url`
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;

    /// Fetch the undecoded body of `url` with its content type
    ///
    /// Fetchers that see raw bytes should override this; the default wraps
    /// the already decoded text.
    async fn fetch_raw(&self, url: &str) -> Result<Page, FetchError> {
        self.fetch_page(url).await.map(Page::from)
    }
}

/// What to do when a request fails before any response arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Report the failure as is
    #[default]
    Never,
    /// Retry a connect/TLS failure once without certificate validation
    RelaxedTls,
}
