// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Two layers:
// - FetchError: what went wrong with a single HTTP request. The retry loop
//   switches on its kind (timeouts and 429s are retried, everything else is
//   terminal).
// - CrawlError: everything that can end a crawl run. Fetch failures are
//   wrapped unchanged so the caller still sees the URL and the cause.
//
// The binary converts these into anyhow errors at the very top (main.rs).
// =============================================================================

use thiserror::Error;

/// Failure of a single HTTP request, classified by kind.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within its timeout
    #[error("request to {url} timed out after {attempts} attempt(s)")]
    Timeout { url: String, attempts: usize },

    /// The server answered 429 Too Many Requests
    #[error("request to {url} was rate limited (HTTP 429) after {attempts} attempt(s)")]
    RateLimited { url: String, attempts: usize },

    /// Any other non-success status code
    #[error("request to {url} failed with HTTP {status}")]
    HttpError { url: String, status: u16 },

    /// DNS resolution or connection failure
    #[error("unable to reach host for {url}")]
    HostUnreachable { url: String },

    /// Anything we could not classify
    #[error("request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    /// Timeouts and rate limiting are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout { .. } | FetchError::RateLimited { .. })
    }

    // Converts a reqwest failure into our closed set of kinds.
    //
    // `attempts` is only meaningful for the retryable kinds and is filled in
    // by the retry loop once it gives up.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url, attempts: 1 }
        } else if error.is_connect() {
            FetchError::HostUnreachable { url }
        } else if let Some(status) = error.status() {
            FetchError::from_status(url, status.as_u16())
        } else {
            FetchError::Other {
                url,
                message: error.to_string(),
            }
        }
    }

    pub fn from_status(url: String, status: u16) -> Self {
        if status == 429 {
            FetchError::RateLimited { url, attempts: 1 }
        } else {
            FetchError::HttpError { url, status }
        }
    }

    // Records how many attempts were spent before giving up.
    pub(crate) fn with_attempts(self, total: usize) -> Self {
        match self {
            FetchError::Timeout { url, .. } => FetchError::Timeout {
                url,
                attempts: total,
            },
            FetchError::RateLimited { url, .. } => FetchError::RateLimited {
                url,
                attempts: total,
            },
            other => other,
        }
    }
}

/// Every way a crawl run can terminate early.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// robots.txt contains `Disallow: /` for every user agent
    #[error("{root_url} does not allow crawling. Terminating.")]
    CrawlingProhibited { root_url: String },

    /// The seed itself matches a disallow rule
    #[error("seed url {seed_url} is marked disallowed for crawling by host. Terminating.")]
    SeedDisallowed { seed_url: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("the frontier is empty")]
    EmptyFrontier,

    /// A fetch task panicked or was cancelled by the runtime
    #[error("fetch task for {url} did not complete: {message}")]
    Task { url: String, message: String },
}
