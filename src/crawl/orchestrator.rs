// src/crawl/orchestrator.rs
// =============================================================================
// This module drives the crawl in batches.
//
// How it works:
// 1. Put the seed url in the frontier, in the same form extracted links take
// 2. Take up to `concurrency` urls out of the frontier (marking them visited)
// 3. Spawn one task per url: wait the crawl delay, fetch the links, enqueue
//    the links that pass the filter
// 4. Wait for the whole batch, record each page's links in the site map
// 5. Repeat until the frontier is empty
//
// A batch never overlaps the next one, so at most `concurrency` fetches are
// in flight. A fatal error in any task ends the crawl; sibling tasks are not
// cancelled, they are left to finish on their own.
// =============================================================================

use super::frontier::Frontier;
use super::site::SiteContext;
use crate::error::CrawlError;
use crate::fetch::{LinkSet, LinkSource};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Every visited URL mapped to the links found on it
pub type SiteMap = BTreeMap<String, LinkSet>;

type FetchTask = JoinHandle<Result<(String, LinkSet), CrawlError>>;

pub struct Crawler {
    frontier: Arc<Frontier>,
    source: Arc<dyn LinkSource>,
    concurrency: usize,
}

impl Crawler {
    pub fn new(source: Arc<dyn LinkSource>, concurrency: usize) -> Self {
        Self {
            frontier: Arc::new(Frontier::new()),
            source,
            concurrency: concurrency.max(1),
        }
    }

    #[cfg(test)]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub async fn crawl(&self, site: &SiteContext) -> Result<SiteMap, CrawlError> {
        let site = Arc::new(site.clone());
        let mut site_map = SiteMap::new();

        self.frontier.enqueue([site.start_url()]);

        let mut batch_number = 0usize;
        while !self.frontier.is_empty() {
            batch_number += 1;

            // Dequeue the whole batch up front so no other batch can overlap it
            let batch_size = self.frontier.len().min(self.concurrency);
            let mut tasks = Vec::with_capacity(batch_size);
            for _ in 0..batch_size {
                let url = self.frontier.dequeue_one()?;
                tasks.push(self.spawn_fetch(url, Arc::clone(&site)));
            }
            debug!("Batch {}: fetching {} page(s)", batch_number, batch_size);

            // Dropping the remaining handles on error detaches those tasks
            let pages = try_join_all(tasks.into_iter().map(|(url, task)| async move {
                task.await.map_err(|e| CrawlError::Task {
                    url,
                    message: e.to_string(),
                })?
            }))
            .await?;

            for (url, links) in pages {
                site_map.insert(url, links);
            }
        }

        info!(
            "Crawled {} page(s) of {} in {} batch(es)",
            site_map.len(),
            site.root_url,
            batch_number
        );
        Ok(site_map)
    }

    fn spawn_fetch(&self, url: String, site: Arc<SiteContext>) -> (String, FetchTask) {
        let source = Arc::clone(&self.source);
        let frontier = Arc::clone(&self.frontier);
        let task_url = url.clone();

        let task = tokio::spawn(async move {
            let delay = site.policy.crawl_delay;
            tokio::time::sleep(delay).await;

            info!("Crawling {}", task_url);
            let links = source.fetch_links(&task_url, delay).await?;

            if !links.is_empty() {
                let accepted = accepted_links(&site, &frontier, &links);
                if !accepted.is_empty() {
                    frontier.enqueue(accepted);
                }
            }

            Ok::<_, CrawlError>((task_url, links))
        });

        (url, task)
    }
}

// Keeps the links that are in scope, not yet visited and not disallowed.
pub fn accepted_links(site: &SiteContext, frontier: &Frontier, links: &LinkSet) -> Vec<String> {
    links
        .iter()
        .filter(|link| {
            if !link.starts_with(&site.root_url) {
                debug!("Skipping external link {}", link);
                false
            } else if frontier.is_visited(link) {
                false
            } else if site.policy.disallow.is_disallowed(link) {
                debug!("Skipping disallowed link {}", link);
                false
            } else {
                true
            }
        })
        .cloned()
        .collect()
}
