//! Tool builder and contract for FeedKit

use crate::client::FetchOptions;
use crate::crawl::{CrawlOptions, Crawler};
use crate::discover::{
    Candidate, Discoverer, DiscoveryObserver, DiscoveryOptions, Stage, TracingObserver,
    DEFAULT_CONCURRENCY,
};
use crate::error::{FeedError, FetchError};
use crate::fetchers::{HttpFetcher, RetryPolicy};
use crate::markup::HtmlMarkup;
use crate::normalize::{normalize, SiteUrl};
use crate::types::{CrawlRequest, CrawlResponse, DiscoverRequest, DiscoverResponse};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Status update during tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    /// Current phase (e.g., "seed", "declared_link", "complete")
    pub phase: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl ToolStatus {
    /// Create a new status with phase
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set completion percentage
    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Builder for configuring the FeedKit tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    user_agent: Option<String>,
    allow_prefixes: Vec<String>,
    block_prefixes: Vec<String>,
    timeout: Option<Duration>,
    concurrency: Option<usize>,
    relaxed_tls: bool,
}

impl ToolBuilder {
    /// Create a new tool builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.block_prefixes.push(prefix.into());
        self
    }

    /// Set the per-fetch timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how many candidates or articles are fetched at once
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Retry connect/TLS failures once without certificate validation
    pub fn relaxed_tls(mut self, enable: bool) -> Self {
        self.relaxed_tls = enable;
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        let defaults = FetchOptions::default();
        let timeout = self.timeout.unwrap_or(defaults.timeout);
        Tool {
            fetch_options: FetchOptions {
                user_agent: self.user_agent,
                allow_prefixes: self.allow_prefixes,
                block_prefixes: self.block_prefixes,
                timeout,
                connect_timeout: defaults.connect_timeout.min(timeout),
                retry: if self.relaxed_tls {
                    RetryPolicy::RelaxedTls
                } else {
                    RetryPolicy::Never
                },
                ..defaults
            },
            timeout,
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
        }
    }
}

/// Configured FeedKit tool
#[derive(Debug, Clone)]
pub struct Tool {
    fetch_options: FetchOptions,
    timeout: Duration,
    concurrency: usize,
}

impl Default for Tool {
    fn default() -> Self {
        ToolBuilder::new().build()
    }
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get discovery input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(DiscoverRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get discovery output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(DiscoverResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get crawl input schema as JSON
    pub fn crawl_input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(CrawlRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get crawl output schema as JSON
    pub fn crawl_output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(CrawlResponse);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Fetch options the tool was configured with
    pub fn fetch_options(&self) -> &FetchOptions {
        &self.fetch_options
    }

    /// Discover the feeds of the requested site
    pub async fn execute(&self, req: DiscoverRequest) -> Result<DiscoverResponse, FeedError> {
        self.discover(req, Arc::new(TracingObserver)).await
    }

    /// Discover feeds, reporting each finished stage to `status_callback`
    pub async fn discover_with_status<F>(
        &self,
        req: DiscoverRequest,
        status_callback: F,
    ) -> Result<DiscoverResponse, FeedError>
    where
        F: Fn(ToolStatus) + Send + Sync + 'static,
    {
        let callback = Arc::new(status_callback);
        callback(ToolStatus::new("validate").with_percent(0.0));

        let observer = StatusObserver {
            callback: callback.clone(),
        };
        let result = self.discover(req, Arc::new(observer)).await;

        let done = match &result {
            Ok(resp) => ToolStatus::new("complete")
                .with_message(format!("{} feed(s) found", resp.feeds.len()))
                .with_percent(100.0),
            Err(err) => ToolStatus::new("complete")
                .with_message(err.to_string())
                .with_percent(100.0),
        };
        callback(done);

        result
    }

    /// Crawl the articles of the requested site's main feed
    pub async fn crawl(&self, req: CrawlRequest) -> Result<CrawlResponse, FeedError> {
        let fetcher = Arc::new(HttpFetcher::new(self.fetch_options.clone())?);
        let discoverer = Discoverer::new(fetcher.clone(), Arc::new(HtmlMarkup::new()))
            .with_options(self.discovery_options());

        Crawler::new(discoverer, fetcher)
            .with_options(CrawlOptions {
                max_articles: req.max_articles,
                concurrency: self.concurrency,
            })
            .crawl(&req.url)
            .await
    }

    async fn discover(
        &self,
        req: DiscoverRequest,
        observer: Arc<dyn DiscoveryObserver>,
    ) -> Result<DiscoverResponse, FeedError> {
        if req.url.trim().is_empty() {
            return Err(FeedError::MissingUrl);
        }

        let fetcher = HttpFetcher::new(self.fetch_options.clone())?;
        let discoverer = Discoverer::new(Arc::new(fetcher), Arc::new(HtmlMarkup::new()))
            .with_options(self.discovery_options())
            .with_observer(observer);

        let report = discoverer.discover_report(&normalize(&req.url)).await;
        Ok(DiscoverResponse::from_report(
            report,
            req.wants_candidates(),
        ))
    }

    fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            timeout: self.timeout,
            concurrency: self.concurrency,
        }
    }
}

/// Turns stage boundaries into [`ToolStatus`] updates
struct StatusObserver<F> {
    callback: Arc<F>,
}

impl<F> DiscoveryObserver for StatusObserver<F>
where
    F: Fn(ToolStatus) + Send + Sync,
{
    fn seed_failed(&self, site: &SiteUrl, error: &FetchError) {
        TracingObserver.seed_failed(site, error);
        (self.callback)(ToolStatus::new(Stage::Seed.as_str()).with_message(error.to_string()));
    }

    fn stage_finished(&self, site: &SiteUrl, stage: Stage, candidates: &[Candidate]) {
        TracingObserver.stage_finished(site, stage, candidates);
        let confirmed = candidates.iter().filter(|c| c.is_confirmed()).count();
        (self.callback)(
            ToolStatus::new(stage.as_str())
                .with_message(format!(
                    "{} of {} candidate(s) confirmed",
                    confirmed,
                    candidates.len()
                ))
                .with_percent(stage_percent(stage)),
        );
    }
}

fn stage_percent(stage: Stage) -> f32 {
    match stage {
        Stage::Seed => 20.0,
        Stage::DeclaredLink => 40.0,
        Stage::LocalAnchor => 60.0,
        Stage::RemoteAnchor => 80.0,
        Stage::GuessedPath => 95.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_tool_builder() {
        let tool = Tool::builder()
            .user_agent("TestAgent/1.0")
            .allow_prefix("https://allowed.com")
            .block_prefix("https://blocked.com")
            .timeout(Duration::from_secs(3))
            .concurrency(0)
            .relaxed_tls(true)
            .build();

        let options = tool.fetch_options();
        assert_eq!(options.user_agent, Some("TestAgent/1.0".to_string()));
        assert_eq!(options.allow_prefixes, vec!["https://allowed.com"]);
        assert_eq!(options.block_prefixes, vec!["https://blocked.com"]);
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.connect_timeout, Duration::from_secs(3));
        assert_eq!(options.retry, RetryPolicy::RelaxedTls);
        assert_eq!(tool.concurrency, 1);
    }

    #[test]
    fn test_tool_description() {
        let tool = Tool::default();
        assert!(!tool.description().is_empty());
        assert!(tool.llmtxt().contains("discover_feeds"));
    }

    #[test]
    fn test_tool_schemas() {
        let tool = Tool::default();
        assert!(tool.input_schema()["properties"]["url"].is_object());
        assert!(tool.output_schema()["properties"]["feeds"].is_object());
        assert!(tool.crawl_input_schema()["properties"]["max_articles"].is_object());
        assert!(tool.crawl_output_schema()["properties"]["articles"].is_object());
    }

    #[test]
    fn test_tool_status() {
        let status = ToolStatus::new("seed")
            .with_message("Fetching site")
            .with_percent(20.0);

        assert_eq!(status.phase, "seed");
        assert_eq!(status.message, Some("Fetching site".to_string()));
        assert_eq!(status.percent_complete, Some(20.0));
    }

    #[tokio::test]
    async fn test_execute_missing_url() {
        let result = Tool::default().execute(DiscoverRequest::new("  ")).await;
        assert!(matches!(result, Err(FeedError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_status_reports_seed_failure() {
        let tool = Tool::builder()
            .timeout(Duration::from_millis(500))
            .build();
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = phases.clone();

        let resp = tool
            .discover_with_status(DiscoverRequest::new("http://127.0.0.1:9"), move |s| {
                sink.lock().unwrap().push(s.phase)
            })
            .await
            .unwrap();

        assert!(resp.feeds.is_empty());
        assert_eq!(resp.stage, None);
        assert_eq!(
            *phases.lock().unwrap(),
            vec!["validate", "seed", "complete"]
        );
    }
}
