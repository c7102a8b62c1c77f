//! HTTP page fetcher
//!
//! Fetches page bodies over HTTP/HTTPS with reqwest. Every failure mode,
//! including non-2xx statuses and slow bodies, is reported as a
//! [`FetchError`] so callers can treat them uniformly.

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::fetchers::{Page, PageFetcher, RetryPolicy};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

/// Accept header favouring feeds, then HTML
const ACCEPT_FEEDS: &str =
    "application/rss+xml, application/atom+xml, application/xml, text/xml, text/html;q=0.9, */*;q=0.8";

/// HTTP fetcher
///
/// Holds one connection pool for the lifetime of the fetcher, plus a
/// second pool without certificate validation when the retry policy is
/// [`RetryPolicy::RelaxedTls`].
pub struct HttpFetcher {
    client: reqwest::Client,
    relaxed_client: Option<reqwest::Client>,
    options: FetchOptions,
}

impl HttpFetcher {
    /// Create a fetcher with the given options
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let client = build_client(&options, false)?;
        let relaxed_client = match options.retry {
            RetryPolicy::Never => None,
            RetryPolicy::RelaxedTls => Some(build_client(&options, true)?),
        };
        Ok(Self {
            client,
            relaxed_client,
            options,
        })
    }

    /// Options this fetcher was built with
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    fn check_url(&self, url: &str) -> Result<(), FetchError> {
        if url.is_empty() {
            return Err(FetchError::MissingUrl);
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchError::InvalidUrlScheme);
        }

        if !self.options.allow_prefixes.is_empty()
            && !self
                .options
                .allow_prefixes
                .iter()
                .any(|prefix| url.starts_with(prefix))
        {
            return Err(FetchError::BlockedUrl);
        }

        if self
            .options
            .block_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
        {
            return Err(FetchError::BlockedUrl);
        }

        Ok(())
    }

    async fn fetch_with(&self, client: &reqwest::Client, url: &str) -> Result<Page, FetchError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len > self.options.max_body_size as u64 {
                return Err(FetchError::TooLarge);
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body =
            read_body_with_timeout(response, self.options.timeout, self.options.max_body_size)
                .await?;
        Ok(Page::new(body, content_type))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_raw(url).await.map(|page| page.text())
    }

    async fn fetch_raw(&self, url: &str) -> Result<Page, FetchError> {
        self.check_url(url)?;

        match self.fetch_with(&self.client, url).await {
            Err(err) if err.is_connect() => match &self.relaxed_client {
                Some(relaxed) => {
                    warn!(url = %url, error = %err, "Retrying without certificate validation");
                    self.fetch_with(relaxed, url).await
                }
                None => Err(err),
            },
            result => result,
        }
    }
}

fn build_client(options: &FetchOptions, relaxed_tls: bool) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_FEEDS));

    let builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(options.connect_timeout)
        .timeout(options.timeout)
        .tls_danger_accept_invalid_certs(relaxed_tls);

    builder.build().map_err(FetchError::ClientBuildError)
}

/// Read a response body, failing if it is too slow or too large
async fn read_body_with_timeout(
    response: reqwest::Response,
    timeout: Duration,
    max_size: usize,
) -> Result<Bytes, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    // None when the timeout is too large to represent; the body never times out
    let deadline = tokio::time::Instant::now().checked_add(timeout);

    loop {
        let chunk_future = stream.next();
        let timeout_future = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        if body.len().saturating_add(bytes.len()) > max_size {
                            return Err(FetchError::TooLarge);
                        }
                        body.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        debug!("Error reading body chunk: {}", e);
                        return Err(FetchError::from_reqwest(e));
                    }
                    None => {
                        return Ok(Bytes::from(body));
                    }
                }
            }
            _ = timeout_future => {
                debug!("Body timeout reached");
                return Err(FetchError::Timeout);
            }
        }
    }
}
