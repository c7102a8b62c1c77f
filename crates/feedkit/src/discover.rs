//! Feed discovery cascade
//!
//! Given a normalized site URL, discovery runs these stages in order and
//! stops at the first one that confirms at least one feed:
//!
//! 0. fetch the site itself; if the body is a feed, the site is the feed
//! 1. `<link>` elements declaring a feed MIME type
//! 2. relative `<a href>` values ending in a feed extension
//! 3. any `<a href>` mentioning a feed keyword
//! 4. a fixed list of conventional feed paths
//!
//! A candidate is confirmed only by fetching it and sniffing its content
//! with [`is_feed_content`]. Failed fetches drop the candidate; a failed
//! seed fetch ends discovery with an empty result.

use crate::classify::{
    feed_url_score, is_feed_content, is_feedlike_url, looks_like_feed_url, rank_feed_urls,
};
use crate::client::DEFAULT_TIMEOUT;
use crate::error::FetchError;
use crate::fetchers::PageFetcher;
use crate::markup::MarkupQuery;
use crate::normalize::SiteUrl;
use futures::stream::{self, StreamExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// `<link type>` values that declare a feed
pub const FEED_MIME_TYPES: &[&str] = &[
    "application/rss+xml",
    "text/xml",
    "application/atom+xml",
    "application/x.atom+xml",
    "application/x-atom+xml",
];

/// Conventional feed locations probed as a last resort
pub const GUESSED_PATHS: &[&str] = &[
    "atom.xml",
    "index.atom",
    "index.rdf",
    "rss.xml",
    "index.xml",
    "index.rss",
    "feeds/latest.rss",
    "rssfeed.rdf",
];

/// Default number of candidates probed at once within a stage
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Cascade stage that produced a candidate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The site URL itself
    Seed,
    /// A `<link>` element with a feed MIME type
    DeclaredLink,
    /// A relative anchor ending in a feed extension
    LocalAnchor,
    /// Any anchor mentioning a feed keyword
    RemoteAnchor,
    /// A conventional feed path
    GuessedPath,
}

impl Stage {
    /// Stage name as used in logs and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Seed => "seed",
            Stage::DeclaredLink => "declared_link",
            Stage::LocalAnchor => "local_anchor",
            Stage::RemoteAnchor => "remote_anchor",
            Stage::GuessedPath => "guessed_path",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A probed candidate URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    /// Absolute candidate URL
    pub url: String,
    /// Stage that produced it
    pub stage: Stage,
    /// Feed markers found in its body, or -1 if it could not be fetched
    pub score: i64,
}

impl Candidate {
    /// True if the candidate's content was classified as a feed
    pub fn is_confirmed(&self) -> bool {
        self.score >= 1
    }

    /// URL-pattern ranking score
    pub fn rank(&self) -> i32 {
        feed_url_score(&self.url)
    }
}

/// Outcome of one discovery call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Normalized site URL
    pub site: String,
    /// Confirmed feed URLs, most likely first
    pub feeds: Vec<String>,
    /// Stage that produced `feeds`, `None` when nothing was found
    pub stage: Option<Stage>,
    /// Every candidate probed, in probe order
    pub candidates: Vec<Candidate>,
}

impl DiscoveryReport {
    fn new(site: &SiteUrl) -> Self {
        Self {
            site: site.to_string(),
            ..Default::default()
        }
    }

    fn already_probed(&self) -> HashSet<String> {
        self.candidates.iter().map(|c| c.url.clone()).collect()
    }
}

/// Discovery tuning
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Upper bound for every single fetch
    pub timeout: Duration,
    /// Candidates probed concurrently within a stage
    pub concurrency: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Receives progress events at stage boundaries
///
/// Both methods default to doing nothing.
pub trait DiscoveryObserver: Send + Sync {
    /// The site itself could not be fetched
    fn seed_failed(&self, _site: &SiteUrl, _error: &FetchError) {}

    /// A stage finished probing `candidates`
    fn stage_finished(&self, _site: &SiteUrl, _stage: Stage, _candidates: &[Candidate]) {}
}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DiscoveryObserver for TracingObserver {
    fn seed_failed(&self, site: &SiteUrl, error: &FetchError) {
        warn!(site = %site, error = %error, "Error while getting site");
    }

    fn stage_finished(&self, site: &SiteUrl, stage: Stage, candidates: &[Candidate]) {
        let confirmed = candidates.iter().filter(|c| c.is_confirmed()).count();
        info!(
            site = %site,
            stage = %stage,
            probed = candidates.len(),
            confirmed,
            "Found {} {} links to feeds",
            confirmed,
            stage
        );
    }
}

/// Runs the discovery cascade
pub struct Discoverer {
    fetcher: Arc<dyn PageFetcher>,
    markup: Arc<dyn MarkupQuery>,
    observer: Arc<dyn DiscoveryObserver>,
    options: DiscoveryOptions,
}

impl Discoverer {
    /// Create a discoverer with default options and a tracing observer
    pub fn new(fetcher: Arc<dyn PageFetcher>, markup: Arc<dyn MarkupQuery>) -> Self {
        Self {
            fetcher,
            markup,
            observer: Arc::new(TracingObserver),
            options: DiscoveryOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: Arc<dyn DiscoveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Options in use
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Ranked feed URLs for `site`, empty if none could be confirmed
    pub async fn discover(&self, site: &SiteUrl) -> Vec<String> {
        self.discover_report(site).await.feeds
    }

    /// Run the cascade and report every probed candidate
    pub async fn discover_report(&self, site: &SiteUrl) -> DiscoveryReport {
        let mut report = DiscoveryReport::new(site);

        let body = match self.fetch(site.as_str()).await {
            Ok(body) => body,
            Err(err) => {
                self.observer.seed_failed(site, &err);
                return report;
            }
        };

        let seed = Candidate {
            url: site.to_string(),
            stage: Stage::Seed,
            score: is_feed_content(&body) as i64,
        };
        self.observer
            .stage_finished(site, Stage::Seed, std::slice::from_ref(&seed));
        let seed_is_feed = seed.is_confirmed();
        report.candidates.push(seed);
        if seed_is_feed {
            report.feeds = vec![site.to_string()];
            report.stage = Some(Stage::Seed);
            return report;
        }

        let Some(base) = site.to_url() else {
            warn!(site = %site, "Site URL cannot be used as a base for links");
            return report;
        };

        let declared: Vec<String> = self
            .markup
            .link_tags(&body)
            .into_iter()
            .filter(|link| link.link_type.as_deref().is_some_and(is_feed_mime_type))
            .inspect(|link| {
                debug!(href = %link.href, rel = link.rel.as_deref().unwrap_or(""), "Declared feed link")
            })
            .filter_map(|link| resolve(&base, &link.href))
            .collect();
        if self
            .run_stage(site, Stage::DeclaredLink, declared, &mut report)
            .await
        {
            return report;
        }

        let mut local = Vec::new();
        let mut remote = Vec::new();
        for href in self.markup.anchor_hrefs(&body) {
            if !href.contains("://") && looks_like_feed_url(&href) {
                local.push(href.clone());
            }
            if is_feedlike_url(&href) {
                remote.push(href);
            }
        }

        let local = resolve_all(&base, &local);
        if self
            .run_stage(site, Stage::LocalAnchor, local, &mut report)
            .await
        {
            return report;
        }

        let remote = resolve_all(&base, &remote);
        if self
            .run_stage(site, Stage::RemoteAnchor, remote, &mut report)
            .await
        {
            return report;
        }

        let guessed = resolve_all(&base, GUESSED_PATHS);
        self.run_stage(site, Stage::GuessedPath, guessed, &mut report)
            .await;
        report
    }

    /// Probe one stage's candidates; true if any was confirmed
    ///
    /// URLs already probed by an earlier stage are skipped: reaching this
    /// stage means they were rejected.
    async fn run_stage(
        &self,
        site: &SiteUrl,
        stage: Stage,
        urls: Vec<String>,
        report: &mut DiscoveryReport,
    ) -> bool {
        let urls: Vec<String> = {
            let mut seen = report.already_probed();
            urls.into_iter()
                .filter(|url| seen.insert(url.clone()))
                .collect()
        };
        debug!(site = %site, stage = %stage, count = urls.len(), "Probing candidates");

        let probed: Vec<Candidate> = stream::iter(urls)
            .map(|url| self.probe(url, stage))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        self.observer.stage_finished(site, stage, &probed);

        let confirmed: Vec<String> = probed
            .iter()
            .filter(|c| c.is_confirmed())
            .map(|c| c.url.clone())
            .collect();
        report.candidates.extend(probed);

        if confirmed.is_empty() {
            return false;
        }
        report.feeds = rank_feed_urls(confirmed);
        report.stage = Some(stage);
        true
    }

    async fn probe(&self, url: String, stage: Stage) -> Candidate {
        let score = match self.fetch(&url).await {
            Ok(body) => is_feed_content(&body) as i64,
            Err(err) => {
                debug!(url = %url, error = %err, "Candidate fetch failed");
                -1
            }
        };
        Candidate { url, stage, score }
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match tokio::time::timeout(self.options.timeout, self.fetcher.fetch_page(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }
}

fn is_feed_mime_type(link_type: &str) -> bool {
    let link_type = link_type.trim();
    FEED_MIME_TYPES
        .iter()
        .any(|mime| link_type.eq_ignore_ascii_case(mime))
}

/// Resolve `href` against `base`, keeping only http(s) results
fn resolve(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

fn resolve_all<I>(base: &Url, hrefs: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    hrefs
        .into_iter()
        .filter_map(|href| resolve(base, href.as_ref()))
        .collect()
}
