// src/crawl/site.rs
// =============================================================================
// Everything the crawler needs to know about the site, built once before the
// crawl starts and never changed afterwards.
// =============================================================================

use crate::error::CrawlError;
use crate::fetch::normalize_link;
use crate::policy::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct SiteContext {
    pub seed_url: String,
    /// Scheme and host of the seed (plus a non-default port)
    pub root_url: String,
    pub policy: Policy,
}

impl SiteContext {
    // Builds the context with an already-resolved policy.
    pub fn new(seed_url: &str, policy: Policy) -> Result<Self, CrawlError> {
        Ok(Self {
            seed_url: seed_url.to_string(),
            root_url: root_url(seed_url)?,
            policy,
        })
    }

    // Derives the root url and resolves the policy from the site's
    // robots.txt.
    pub async fn create(
        client: &Client,
        seed_url: &str,
        fallback_delay: Duration,
        robots_timeout: Duration,
    ) -> Result<Self, CrawlError> {
        let root = root_url(seed_url)?;
        let policy = Policy::resolve(client, &root, seed_url, fallback_delay, robots_timeout).await?;
        Self::new(seed_url, policy)
    }

    // The seed in the form links take once extracted from a page, so that
    // "https://host" and a link to "https://host/" are the same page.
    pub fn start_url(&self) -> String {
        match Url::parse(&self.seed_url) {
            Ok(url) => normalize_link(url.as_str()).to_string(),
            Err(_) => self.seed_url.clone(),
        }
    }
}

// "https://www.test.com/aa/bb?x=1" -> "https://www.test.com"
pub fn root_url(seed_url: &str) -> Result<String, CrawlError> {
    let invalid = |reason: String| CrawlError::InvalidUrl {
        url: seed_url.to_string(),
        reason,
    };

    let url = Url::parse(seed_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("url has no host".to_string()));
    }

    Ok(url.origin().ascii_serialization())
}
