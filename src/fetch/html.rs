// src/fetch/html.rs
// =============================================================================
// This module extracts crawlable links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Every link is resolved against the page url and then normalized: query
// strings and fragments are dropped, so `/a?x=1#top` and `/a` are the same
// page as far as the crawler is concerned.
// =============================================================================

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Deduplicated, normalized absolute links found on one page
pub type LinkSet = BTreeSet<String>;

// Extracts all links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL of the page (for resolving relative links)
//
// Returns: the normalized absolute http(s) links on the page
//
// Example:
//   html = "<a href='/docs?page=2#intro'>Docs</a>"
//   page_url = "https://example.com"
//   result = {"https://example.com/docs"}
pub fn extract_links(html: &str, page_url: &str) -> LinkSet {
    let mut links = LinkSet::new();

    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Invalid page url {}: {}", page_url, e);
            return links;
        }
    };

    let document = Html::parse_document(html);

    // Constant selector, parsing cannot fail
    let selector = Selector::parse("a[href]").expect("a[href] is a valid selector");

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute) = resolve_url(&base, href) {
                links.insert(normalize_link(&absolute).to_string());
            }
        }
    }

    links
}

// Resolves a possibly-relative href to an absolute http(s) URL
//
// Examples (base = "https://example.com/page"):
//   "/docs"              -> Some("https://example.com/docs")
//   "../other"           -> Some("https://example.com/other")
//   "https://other.com"  -> Some("https://other.com/")
//   "mailto:a@b.com"     -> None (not HTTP)
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

/// Strips the query string and then the fragment from a link.
pub fn normalize_link(link: &str) -> &str {
    let without_query = link.split('?').next().unwrap_or(link);
    without_query.split('#').next().unwrap_or(without_query)
}
