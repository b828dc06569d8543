// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Batched concurrent crawling starting from a seed URL
// - Same-origin restriction (doesn't crawl external sites)
// - Respects robots.txt crawl delay and disallow rules
// - Every page is fetched at most once per run
//
// Submodules:
// - frontier: pending urls and the visited set behind one lock
// - site: seed url, root url and resolved politeness policy
// - orchestrator: the batch loop that ties everything together
// =============================================================================

mod frontier;
mod orchestrator;
mod site;

pub use orchestrator::{Crawler, SiteMap};
pub use site::{root_url, SiteContext};

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::fetch::PageFetcher;
use std::sync::Arc;
use tracing::info;

// Crawls a whole site.
//
// Parameters:
//   seed_url: where to start (e.g. "https://example.com/blog")
//   config: validated concurrency, fallback delay and client settings
//     (see CrawlConfig::new for the accepted ranges)
//
// Returns: every visited url mapped to the links found on it
pub async fn begin_crawl(seed_url: &str, config: &CrawlConfig) -> Result<SiteMap, CrawlError> {
    let fetcher =
        PageFetcher::new(&config.user_agent)?.with_default_timeout(config.default_timeout);

    let site = SiteContext::create(
        fetcher.client(),
        seed_url,
        config.fallback_delay,
        config.robots_timeout,
    )
    .await?;

    info!("Crawling {} with concurrency {}...", site.root_url, config.concurrency);
    let crawler = Crawler::new(Arc::new(fetcher), config.concurrency);
    crawler.crawl(&site).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(concurrency: usize) -> CrawlConfig {
        CrawlConfig::new(concurrency, 0.0).unwrap()
    }

    async fn page(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_crawls_site_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        page(
            &server,
            "/",
            r#"<a href="/1">One</a><a href="/4#top">Four</a><a href="https://elsewhere.org/">Out</a>"#,
        )
        .await;
        page(&server, "/1", "<p>leaf</p>").await;
        page(&server, "/4", r#"<a href="/">Home</a><a href="/1">One again</a>"#).await;

        let root = server.uri();
        let site_map = begin_crawl(&root, &config(2)).await.unwrap();

        // The bare seed and the "/" link are the same page
        assert_eq!(site_map.len(), 3);
        let start = format!("{}/", root);
        assert!(!site_map.contains_key(&root));
        assert!(site_map[&format!("{}/4", root)].contains(&start));
        let seed_links = &site_map[&start];
        assert!(seed_links.contains(&format!("{}/1", root)));
        assert!(seed_links.contains(&format!("{}/4", root)));
        assert!(seed_links.contains("https://elsewhere.org/"));
        assert!(site_map[&format!("{}/1", root)].is_empty());
    }

    #[tokio::test]
    async fn test_robots_rules_gate_the_crawl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
            )
            .mount(&server)
            .await;
        page(&server, "/", r#"<a href="/private/a">A</a><a href="/public">B</a>"#).await;
        page(&server, "/public", "").await;

        let root = server.uri();
        let site_map = begin_crawl(&root, &config(4)).await.unwrap();

        assert_eq!(site_map.len(), 2);
        assert!(!site_map.contains_key(&format!("{}/private/a", root)));
    }

    #[tokio::test]
    async fn test_http_error_aborts_crawl() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = begin_crawl(&server.uri(), &config(1)).await;
        assert!(matches!(
            result,
            Err(CrawlError::Fetch(FetchError::HttpError { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_invalid_seed_rejected() {
        assert!(matches!(
            begin_crawl("not a url", &config(1)).await,
            Err(CrawlError::InvalidUrl { .. })
        ));
    }
}
