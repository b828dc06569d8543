// src/policy/mod.rs
// =============================================================================
// The politeness policy of a site: how long to wait before each request and
// which URLs must never be fetched.
//
// Submodules:
// - robots: fetches robots.txt and interprets the `User-agent: *` block
// - rules: exact and wildcard disallow rules
// =============================================================================

mod robots;
pub(crate) mod rules;

use robots::{build_policy, fetch_robots_file, wildcard_block};
use rules::DisallowRules;

use crate::error::CrawlError;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// Crawl delay plus disallow rules, resolved once per crawl.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Pause before every page fetch
    pub crawl_delay: Duration,
    pub disallow: DisallowRules,
}

impl Policy {
    /// No rules at all, only a delay.
    pub fn permissive(crawl_delay: Duration) -> Self {
        Self {
            crawl_delay,
            disallow: DisallowRules::new(),
        }
    }

    // Resolves the policy for `root_url` from its robots.txt.
    //
    // Fails when the host is unreachable, when the site forbids crawling
    // entirely, or when the seed url itself is disallowed.
    pub async fn resolve(
        client: &Client,
        root_url: &str,
        seed_url: &str,
        fallback_delay: Duration,
        robots_timeout: Duration,
    ) -> Result<Self, CrawlError> {
        match fetch_robots_file(client, root_url, robots_timeout).await? {
            Some(text) => build_policy(&wildcard_block(&text), root_url, seed_url, fallback_delay),
            None => {
                info!("Crawl delay set to {} ms.", fallback_delay.as_millis());
                Ok(Self::permissive(fallback_delay))
            }
        }
    }
}
