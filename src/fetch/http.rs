// src/fetch/http.rs
// =============================================================================
// This module downloads pages and turns them into link sets.
//
// Key functionality:
// - Makes HTTP GET requests with a per-attempt timeout
// - Retries timeouts and 429 responses with a linear backoff
// - Treats every other failure as terminal for the whole crawl
// - Ignores the declared content type (the body is always parsed as HTML)
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Result<T, E>: Errors are a closed enum we can match on
// - tokio::time::sleep: Backoff without blocking the worker thread
// =============================================================================

use super::html::{extract_links, LinkSet};
use super::LinkSource;
use crate::config::{DEFAULT_TIMEOUT, MAX_ATTEMPTS};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// A downloaded page and the url it was finally served from.
///
/// After a redirect `url` differs from the requested one, and relative links
/// in `body` resolve against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
    pub body: String,
}

/// Fetches pages over HTTP and extracts their links.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    default_timeout: Duration,
}

impl PageFetcher {
    // Builds a fetcher with its own connection pool.
    //
    // Client is cheap to clone (it's an Arc internally), so every fetch task
    // can hold its own handle.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Other {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // The crawl delay doubles as the per-attempt timeout. Zero means "use
    // the default".
    fn attempt_timeout(&self, delay_hint: Duration) -> Duration {
        if delay_hint.is_zero() {
            self.default_timeout
        } else {
            delay_hint
        }
    }

    // Fetches the page body, retrying timeouts and rate limiting.
    //
    // Attempt n (1-based) that fails with a retryable error is followed by a
    // wait of `timeout * n` before the next one. The final failure is
    // returned with the number of attempts spent.
    //
    // Returns Ok(None) only if no attempt produced a document without
    // failing, which cannot happen while MAX_ATTEMPTS > 0.
    pub async fn fetch_document(
        &self,
        url: &str,
        delay_hint: Duration,
    ) -> Result<Option<Document>, FetchError> {
        let timeout = self.attempt_timeout(delay_hint);

        for attempt in 1..=MAX_ATTEMPTS {
            match self.get_once(url, timeout).await {
                Ok(document) => return Ok(Some(document)),
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    let backoff = backoff_after(timeout, attempt);
                    warn!(
                        "Unable to fetch {}. {} occurred {} time(s). Retrying in {} ms...",
                        url,
                        retry_reason(&e),
                        attempt,
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    let e = e.with_attempts(attempt);
                    warn!("Unable to fetch {}. Terminating crawl. Error: {}", url, e);
                    return Err(e);
                }
            }
        }

        Ok(None)
    }

    // A single GET. Status codes are checked before the body is read.
    async fn get_once(&self, url: &str, timeout: Duration) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(url.to_string(), status.as_u16()));
        }

        // Captured before text() consumes the response
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(Document {
            url: final_url,
            body,
        })
    }
}

// Wait after the n-th (1-based) failed attempt. Saturates instead of
// overflowing when a site asks for an absurd crawl delay.
fn backoff_after(timeout: Duration, attempt: usize) -> Duration {
    let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
    timeout.saturating_mul(factor)
}

fn retry_reason(error: &FetchError) -> &'static str {
    match error {
        FetchError::RateLimited { .. } => "Rate limiting",
        _ => "Timeout",
    }
}

#[async_trait]
impl LinkSource for PageFetcher {
    async fn fetch_links(&self, url: &str, delay_hint: Duration) -> Result<LinkSet, FetchError> {
        match self.fetch_document(url, delay_hint).await? {
            Some(document) => {
                if document.url != url {
                    debug!("{} redirected to {}", url, document.url);
                }
                let links = extract_links(&document.body, &document.url);
                debug!("{} link(s) found on {}", links.len(), url);
                Ok(links)
            }
            None => Ok(LinkSet::new()),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is #[async_trait]?
//    - Lets a trait have async methods that can be used as `dyn LinkSource`
//    - The crawler holds an Arc<dyn LinkSource>, tests swap in a fake
//
// 2. Why is a 404 not retried?
//    - Asking again will not make the page appear
//    - Timeouts and 429s are temporary, so they get another chance
//
// 3. Why tokio::time::sleep and not std::thread::sleep?
//    - std's sleep blocks the whole worker thread
//    - tokio's sleep only pauses this task; other fetches keep running
// -----------------------------------------------------------------------------
