//! Request and response types for the FeedKit tool

use crate::discover::{Candidate, DiscoveryReport, Stage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request to discover the feeds of a site
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DiscoverRequest {
    /// Site address as a user would type it (e.g. `zeit.de`, `feed://…`, full URL)
    pub url: String,

    /// Include every probed candidate in the response (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_candidates: Option<bool>,
}

impl DiscoverRequest {
    /// Create a new request for the given site
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Ask for the probed candidates as well
    pub fn with_candidates(mut self) -> Self {
        self.with_candidates = Some(true);
        self
    }

    /// Check if candidates are requested
    pub fn wants_candidates(&self) -> bool {
        self.with_candidates.unwrap_or(false)
    }
}

/// Feeds discovered for a site
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DiscoverResponse {
    /// Normalized site URL
    pub site: String,

    /// Confirmed feed URLs, most likely first
    pub feeds: Vec<String>,

    /// Discovery stage that found the feeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    /// Every probed candidate, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
}

impl DiscoverResponse {
    /// Build a response from a discovery report
    pub fn from_report(report: DiscoveryReport, with_candidates: bool) -> Self {
        Self {
            site: report.site,
            feeds: report.feeds,
            stage: report.stage,
            candidates: with_candidates.then_some(report.candidates),
        }
    }
}

/// Request to crawl the articles of a site's main feed
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CrawlRequest {
    /// Site address as a user would type it
    pub url: String,

    /// Maximum number of entries to ingest (optional, default all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_articles: Option<usize>,
}

impl CrawlRequest {
    /// Create a new request for the given site
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Limit the number of ingested entries
    pub fn max_articles(mut self, max: usize) -> Self {
        self.max_articles = Some(max);
        self
    }
}

/// One feed entry with its article text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Article {
    /// Entry title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Entry summary as plain text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Authors, comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Publication time in Unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<i64>,

    /// Link to the article page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Categories, comma separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    /// Text extracted from the article page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Articles ingested from a site's main feed
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CrawlResponse {
    /// Normalized site URL
    pub site: String,

    /// Feed the articles were read from
    pub feed: String,

    /// Feed title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Ingested entries in feed order
    pub articles: Vec<Article>,
}
