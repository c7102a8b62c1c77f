//! Example: Discover the feeds of a few news sites
//!
//! Run with: cargo run -p feedkit --example discover_sites
//!
//! Sites are given the way a user would type them; discovery normalizes
//! them and reports which stage found the feeds.

use feedkit::{DiscoverRequest, DiscoverResponse, Tool};

/// Site to probe
struct TestCase {
    site: &'static str,
    description: &'static str,
    expect_feed: bool,
}

const TEST_CASES: &[TestCase] = &[
    TestCase {
        site: "zeit.de",
        description: "Bare domain, declared feed links",
        expect_feed: true,
    },
    TestCase {
        site: "https://www.spiegel.de/",
        description: "Full URL",
        expect_feed: true,
    },
    TestCase {
        site: "faz.net",
        description: "Bare domain",
        expect_feed: true,
    },
    TestCase {
        site: "feed://www.tagesschau.de/xml/rss2",
        description: "feed:// subscription link",
        expect_feed: true,
    },
];

#[tokio::main]
async fn main() {
    println!("FeedKit Discovery Examples");
    println!("==========================\n");

    let tool = Tool::default();
    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in TEST_CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   Site: {}", case.site);

        match tool.execute(DiscoverRequest::new(case.site)).await {
            Ok(response) => {
                print_response_summary(&response);

                if response.feeds.is_empty() != case.expect_feed {
                    println!("   ✓ PASS\n");
                    passed += 1;
                } else {
                    println!("   ✗ FAIL (expectations not met)\n");
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("==========================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_response_summary(response: &DiscoverResponse) {
    println!("   Normalized: {}", response.site);

    if let Some(stage) = response.stage {
        println!("   Stage: {}", stage);
    }

    for feed in response.feeds.iter().take(5) {
        println!("   Feed: {}", feed);
    }
    if response.feeds.len() > 5 {
        println!("   ... and {} more", response.feeds.len() - 5);
    }
}
