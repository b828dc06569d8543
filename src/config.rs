// src/config.rs
// =============================================================================
// Run configuration for a crawl.
//
// The CLI collects the raw values (seed url, concurrency, fallback delay)
// and CrawlConfig::new validates them once. After that the engine can trust
// every field.
// =============================================================================

use crate::error::CrawlError;
use std::time::Duration;

/// Maximum number of fetch attempts per page
pub const MAX_ATTEMPTS: usize = 3;

/// Per-attempt timeout when the site publishes no crawl delay and the
/// fallback delay is zero
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on runtime worker threads, whatever the concurrency
pub const MAX_WORKER_THREADS: usize = 30;

pub const MIN_CONCURRENCY: usize = 1;
pub const MAX_CONCURRENCY: usize = 100;
pub const MAX_FALLBACK_DELAY_SECS: f64 = 200.0;

pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Size of each batch of concurrent fetches
    pub concurrency: usize,
    /// Crawl delay used when robots.txt does not set one
    pub fallback_delay: Duration,
    pub user_agent: String,
    /// Timeout for the robots.txt request
    pub robots_timeout: Duration,
    /// Per-attempt page timeout when the crawl delay is zero
    pub default_timeout: Duration,
}

impl CrawlConfig {
    // Validates the two user-facing knobs and fills in defaults for the rest.
    pub fn new(concurrency: usize, fallback_delay_secs: f64) -> Result<Self, CrawlError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(CrawlError::InvalidConfig(format!(
                "concurrency must be between {} and {}, got {}",
                MIN_CONCURRENCY, MAX_CONCURRENCY, concurrency
            )));
        }

        if !fallback_delay_secs.is_finite()
            || !(0.0..=MAX_FALLBACK_DELAY_SECS).contains(&fallback_delay_secs)
        {
            return Err(CrawlError::InvalidConfig(format!(
                "delay must be between 0.00 and {:.2} seconds, got {}",
                MAX_FALLBACK_DELAY_SECS, fallback_delay_secs
            )));
        }

        Ok(Self {
            concurrency,
            fallback_delay: Duration::from_secs_f64(fallback_delay_secs),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            robots_timeout: DEFAULT_TIMEOUT,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Number of runtime worker threads to start for this run.
    pub fn worker_threads(&self) -> usize {
        self.concurrency.min(MAX_WORKER_THREADS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = CrawlConfig::new(5, 1.5).unwrap();
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.fallback_delay, Duration::from_millis(1500));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_concurrency_out_of_range() {
        assert!(CrawlConfig::new(0, 1.0).is_err());
        assert!(CrawlConfig::new(101, 1.0).is_err());
        assert!(CrawlConfig::new(100, 1.0).is_ok());
    }

    #[test]
    fn test_delay_out_of_range() {
        assert!(CrawlConfig::new(1, -0.5).is_err());
        assert!(CrawlConfig::new(1, 200.01).is_err());
        assert!(CrawlConfig::new(1, f64::NAN).is_err());
        assert!(CrawlConfig::new(1, 0.0).is_ok());
    }

    #[test]
    fn test_worker_threads_are_capped() {
        assert_eq!(CrawlConfig::new(8, 0.0).unwrap().worker_threads(), 8);
        assert_eq!(CrawlConfig::new(100, 0.0).unwrap().worker_threads(), MAX_WORKER_THREADS);
    }
}
