//! FeedKit - feed discovery and article ingestion for arbitrary sites
//!
//! Given nothing more than a site address, FeedKit finds the site's
//! RSS/Atom/RDF feeds and can ingest the articles they point to.
//!
//! ## Discovery
//!
//! [`Discoverer`] runs a cascade of increasingly speculative stages and
//! stops at the first one that confirms a feed by fetching it:
//! the site itself, declared `<link>` elements, relative anchors with a
//! feed extension, any anchor mentioning a feed keyword, and finally a
//! list of conventional feed paths. Confirmed feeds are ranked by URL
//! pattern so the most likely main feed comes first.
//!
//! Pages are fetched through the [`PageFetcher`] trait and parsed through
//! [`MarkupQuery`]; [`HttpFetcher`] and [`HtmlMarkup`] are the built-in
//! implementations.
//!
//! ## Crawling
//!
//! [`Crawler`] takes the top-ranked feed, parses it and extracts the text
//! of every linked article page.

pub mod classify;
pub mod client;
mod convert;
pub mod crawl;
pub mod discover;
mod error;
pub mod fetchers;
pub mod markup;
pub mod normalize;
mod tool;
mod types;

pub use classify::{feed_url_score, is_feed_content, rank_feed_urls};
pub use client::{crawl, crawl_with_options, discover, discover_with_options, FetchOptions};
pub use convert::{fragment_to_text, html_to_text};
pub use crawl::{CrawlOptions, Crawler};
pub use discover::{
    Candidate, Discoverer, DiscoveryObserver, DiscoveryOptions, DiscoveryReport, Stage,
    TracingObserver,
};
pub use error::{FeedError, FetchError};
pub use fetchers::{HttpFetcher, Page, PageFetcher, RetryPolicy};
pub use markup::{HtmlMarkup, LinkTag, MarkupQuery};
pub use normalize::{normalize, SiteUrl};
pub use tool::{Tool, ToolBuilder, ToolStatus};
pub use types::{Article, CrawlRequest, CrawlResponse, DiscoverRequest, DiscoverResponse};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "FeedKit/1.0";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Finds the RSS/Atom feeds of a website and ingests their articles.

- Accepts bare domains, feed:// links and full URLs
- Confirms every feed by fetching and sniffing it
- Ranks feeds so the main feed comes first
- Extracts article text from the pages a feed links to"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# FeedKit Tool

Finds the syndication feeds of a website and optionally ingests their articles.

## Tools

### discover_feeds
Returns the confirmed feed URLs of a site, most likely main feed first.

Input:
- `url` (required): Site address, e.g. `zeit.de`, `feed://example.com/rss`, `https://example.com/blog/`
- `with_candidates` (optional): Also return every probed candidate with its score

Output:
- `site`: The normalized site URL
- `feeds`: Confirmed feed URLs, ranked
- `stage`: Which discovery stage found them (`seed`, `declared_link`, `local_anchor`, `remote_anchor`, `guessed_path`)
- `candidates`: Probed candidates (only when requested)

### crawl_feed
Discovers the main feed of a site and ingests its entries.

Input:
- `url` (required): Site address
- `max_articles` (optional): Ingest at most this many entries

Output:
- `site`, `feed`, `title`
- `articles`: `title`, `summary`, `author`, `published` (Unix seconds), `link`, `tags`, `text`

## Discovery Order
1. The site itself, if it already is a feed
2. `<link>` elements with a feed MIME type
3. Relative links ending in .rss/.rdf/.xml/.atom
4. Any link mentioning rss, rdf, xml, atom or feed
5. Conventional paths such as /atom.xml, /rss.xml, /index.rdf

## Examples

### Find the feeds of a news site
```json
{"url": "spiegel.de"}
```

### Crawl the latest five articles
```json
{"url": "faz.net", "max_articles": 5}
```

## Error Handling
- An unreachable site or a site without feeds returns an empty `feeds` list
- Crawling a site without feeds returns an error
- Article pages that cannot be fetched keep their metadata without `text`
"#;
