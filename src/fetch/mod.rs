// src/fetch/mod.rs
// =============================================================================
// This module turns a URL into the set of links found on that page.
//
// Submodules:
// - http: downloads a page with timeout and retry (PageFetcher)
// - html: extracts and normalizes the links of a downloaded page
//
// The crawler only depends on the LinkSource trait, so tests can script the
// web with an in-memory implementation instead of a real server.
// =============================================================================

mod html;
mod http;

pub use html::{normalize_link, LinkSet};
pub use http::PageFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can produce the links of a page.
#[async_trait]
pub trait LinkSource: Send + Sync {
    // `delay_hint` is the site's crawl delay. Implementations that talk to
    // the network use it as their per-attempt timeout.
    async fn fetch_links(&self, url: &str, delay_hint: Duration) -> Result<LinkSet, FetchError>;
}
