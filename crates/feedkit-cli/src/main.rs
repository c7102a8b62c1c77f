//! FeedKit CLI - Command-line interface for feed discovery and crawling

mod mcp;

use clap::{Parser, Subcommand, ValueEnum};
use feedkit::{
    CrawlRequest, CrawlResponse, DiscoverRequest, DiscoverResponse, Tool, ToolBuilder,
    TOOL_LLMTXT,
};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Output format for discover subcommand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum DiscoverFormat {
    /// One feed URL per line
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Output format for crawl subcommand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum CrawlFormat {
    /// Markdown with one section per article
    #[default]
    Md,
    /// JSON format
    Json,
}

/// FeedKit - find the feeds of any website
#[derive(Parser, Debug)]
#[command(name = "feedkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Candidates or articles fetched at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Custom User-Agent
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Retry TLS/connect failures once without certificate validation
    #[arg(long, global = true)]
    relaxed_tls: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Discover the feeds of a site
    Discover {
        /// Site address (e.g. zeit.de, feed://host/path, https://host/)
        site: String,

        /// Output format
        #[arg(long, short, default_value = "text")]
        output: DiscoverFormat,

        /// Include every probed candidate (json output only)
        #[arg(long)]
        candidates: bool,
    },
    /// Discover a site's main feed and ingest its articles
    Crawl {
        /// Site address
        site: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: CrawlFormat,

        /// Ingest at most this many articles
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    // Logs go to stderr; stdout carries results and MCP traffic
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let tool = build_tool(&cli).build();

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server(tool).await;
        }
        Some(Commands::Discover {
            site,
            output,
            candidates,
        }) => {
            run_discover(&tool, &site, output, candidates).await;
        }
        Some(Commands::Crawl {
            site,
            output,
            limit,
        }) => {
            run_crawl(&tool, &site, output, limit).await;
        }
        None => {
            eprintln!("Usage: feedkit discover <SITE>");
            eprintln!("   or: feedkit crawl <SITE>");
            eprintln!("   or: feedkit mcp");
            eprintln!("   or: feedkit --help");
            std::process::exit(1);
        }
    }
}

fn build_tool(cli: &Cli) -> ToolBuilder {
    let mut builder = Tool::builder().relaxed_tls(cli.relaxed_tls);

    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs.max(1)));
    }
    if let Some(concurrency) = cli.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(ua) = &cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }

    builder
}

async fn run_discover(tool: &Tool, site: &str, output: DiscoverFormat, candidates: bool) {
    let mut request = DiscoverRequest::new(site);
    if candidates {
        request = request.with_candidates();
    }

    match tool.execute(request).await {
        Ok(response) => match output {
            DiscoverFormat::Text => {
                if response.feeds.is_empty() {
                    eprintln!("No feeds found for {}", response.site);
                    std::process::exit(2);
                }
                writeln_safe(&format_feed_list(&response));
            }
            DiscoverFormat::Json => print_json(&response),
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_crawl(tool: &Tool, site: &str, output: CrawlFormat, limit: Option<usize>) {
    let mut request = CrawlRequest::new(site);
    if let Some(limit) = limit {
        request = request.max_articles(limit);
    }

    match tool.crawl(request).await {
        Ok(response) => match output {
            CrawlFormat::Md => writeln_safe(&format_crawl_md(&response)),
            CrawlFormat::Json => print_json(&response),
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    });
    writeln_safe(&json);
}

/// Feed URLs, one per line
fn format_feed_list(response: &DiscoverResponse) -> String {
    response.feeds.join("\n")
}

/// Format crawled articles as markdown with YAML frontmatter
fn format_crawl_md(response: &CrawlResponse) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("site: {}\n", response.site));
    output.push_str(&format!("feed: {}\n", response.feed));
    if let Some(ref title) = response.title {
        output.push_str(&format!("title: {}\n", title));
    }
    output.push_str(&format!("articles: {}\n", response.articles.len()));
    output.push_str("---\n");

    for article in &response.articles {
        output.push_str(&format!(
            "\n## {}\n\n",
            article.title.as_deref().unwrap_or("(untitled)")
        ));
        if let Some(ref link) = article.link {
            output.push_str(&format!("- link: {}\n", link));
        }
        if let Some(ref author) = article.author {
            output.push_str(&format!("- author: {}\n", author));
        }
        if let Some(published) = article.published {
            output.push_str(&format!("- published: {}\n", published));
        }
        if let Some(ref tags) = article.tags {
            output.push_str(&format!("- tags: {}\n", tags));
        }

        if let Some(body) = article.text.as_ref().or(article.summary.as_ref()) {
            output.push('\n');
            output.push_str(body);
            output.push('\n');
        }
    }

    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
