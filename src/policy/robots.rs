// src/policy/robots.rs
// =============================================================================
// Fetching and interpreting robots.txt.
//
// How it works:
// 1. GET {root_url}/robots.txt
// 2. Keep only the lines of the `User-agent: *` block
// 3. Read Crawl-delay (seconds) from that block
// 4. Turn every Disallow value into an exact string or a wildcard pattern
// 5. Refuse to crawl at all if the block says `Disallow: /` or if the seed
//    url itself is disallowed
//
// Only an unreachable host is fatal while fetching. A missing or unreadable
// file means "no rules" and the caller's fallback delay.
// =============================================================================

use super::rules::{DisallowPattern, DisallowRules};
use super::Policy;
use crate::error::{CrawlError, FetchError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

const WILDCARD_AGENT: &str = "*";
const NO_CRAWLING: &str = "/";

/// A single `key: value` line from the wildcard block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Lowercased key, e.g. "disallow"
    pub key: String,
    pub value: String,
}

impl Directive {
    fn parse(line: &str) -> Option<Self> {
        // Everything after '#' is a comment
        let line = line.split('#').next().unwrap_or("").trim();
        let (key, value) = line.split_once(':')?;
        Some(Self {
            key: key.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
        })
    }
}

// Fetches the raw robots.txt text.
//
// Returns:
//   Ok(Some(text)) = file found
//   Ok(None)       = no usable file, proceed with defaults
//   Err(..)        = host unreachable, the crawl cannot proceed
pub async fn fetch_robots_file(
    client: &Client,
    root_url: &str,
    timeout: Duration,
) -> Result<Option<String>, FetchError> {
    let robots_url = format!("{}/robots.txt", root_url.trim_end_matches('/'));

    let response = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return match FetchError::from_reqwest(&robots_url, e) {
                FetchError::HostUnreachable { .. } => Err(FetchError::HostUnreachable {
                    url: root_url.to_string(),
                }),
                other => {
                    warn!(
                        "Unable to locate and/or process robots.txt file for {}. Error: {}. \
                         Proceeding with default politeness policy.",
                        root_url, other
                    );
                    Ok(None)
                }
            };
        }
    };

    if !response.status().is_success() {
        warn!(
            "No robots.txt for {} (HTTP {}). Proceeding with default politeness policy.",
            root_url,
            response.status().as_u16()
        );
        return Ok(None);
    }

    match response.text().await {
        Ok(text) => Ok(Some(text)),
        Err(e) => {
            warn!(
                "Unable to read robots.txt for {}: {}. Proceeding with default politeness policy.",
                root_url, e
            );
            Ok(None)
        }
    }
}

// Collects the directives of the `User-agent: *` block.
//
// Scanning stops at the first `User-agent:` line after the block opened.
pub fn wildcard_block(text: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut inside_block = false;

    for directive in text.lines().filter_map(Directive::parse) {
        if directive.key == "user-agent" {
            if inside_block {
                break;
            }
            inside_block = directive.value == WILDCARD_AGENT;
        } else if inside_block {
            directives.push(directive);
        }
    }

    directives
}

// Crawl-delay is given in (possibly fractional) seconds.
fn crawl_delay(directives: &[Directive]) -> Option<Duration> {
    let value = directives.iter().find(|d| d.key == "crawl-delay")?;
    let seconds: f64 = value.value.parse().ok()?;
    // Negative, NaN and values too large for a Duration all fall back
    Duration::try_from_secs_f64(seconds).ok()
}

// Builds the disallow rules, failing if the site forbids crawling outright.
fn disallow_rules(directives: &[Directive], root_url: &str) -> Result<DisallowRules, CrawlError> {
    let mut rules = DisallowRules::new();

    for directive in directives.iter().filter(|d| d.key == "disallow") {
        if directive.value == NO_CRAWLING {
            return Err(CrawlError::CrawlingProhibited {
                root_url: root_url.to_string(),
            });
        }

        let value = directive.value.strip_suffix('/').unwrap_or(&directive.value);
        if value.is_empty() {
            // An empty Disallow allows everything
            continue;
        }

        if value.contains('*') {
            match DisallowPattern::compile(value, root_url) {
                Ok(pattern) => rules.add_pattern(pattern),
                Err(e) => warn!("Skipping unparseable disallow rule '{}': {}", value, e),
            }
        } else if value.starts_with('/') {
            let path = value.strip_suffix('$').unwrap_or(value);
            rules.add_exact(format!("{}{}", root_url, path));
        } else {
            rules.add_exact(value);
        }
    }

    Ok(rules)
}

// Turns the wildcard block into a Policy and checks the seed against it.
pub fn build_policy(
    directives: &[Directive],
    root_url: &str,
    seed_url: &str,
    fallback_delay: Duration,
) -> Result<Policy, CrawlError> {
    let crawl_delay = crawl_delay(directives).unwrap_or(fallback_delay);
    info!("Crawl delay set to {} ms.", crawl_delay.as_millis());

    let disallow = disallow_rules(directives, root_url)?;
    if disallow.is_empty() {
        debug!("No disallow rules for {}", root_url);
    } else {
        debug!(
            "{} exact and {} wildcard disallow rule(s) for {}",
            disallow.exact().len(),
            disallow.patterns().len(),
            root_url
        );
    }

    if disallow.is_disallowed(seed_url) {
        return Err(CrawlError::SeedDisallowed {
            seed_url: seed_url.to_string(),
        });
    }

    Ok(Policy {
        crawl_delay,
        disallow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ROOT: &str = "https://www.test2.com";
    const FALLBACK: Duration = Duration::from_millis(1);

    const ROBOTS: &str = "\
User-agent: Googlebot
Disallow: /only-google

User-agent: *
Crawl-delay: 5
Disallow: /drafts/
Disallow: *?s=bpage-next
Disallow:

User-agent: Bingbot
Disallow: /only-bing
";

    fn policy_for(text: &str) -> Result<Policy, CrawlError> {
        build_policy(&wildcard_block(text), ROOT, ROOT, FALLBACK)
    }

    #[test]
    fn test_only_wildcard_block_is_collected() {
        let directives = wildcard_block(ROBOTS);
        assert_eq!(directives.len(), 4);
        assert!(directives.iter().all(|d| !d.value.contains("only-")));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let directives = wildcard_block("USER-AGENT: *\nCRAWL-DELAY: 2\ndisAllow: /private\n");
        assert_eq!(directives[0].key, "crawl-delay");
        assert_eq!(directives[1].key, "disallow");
    }

    #[test]
    fn test_host_crawl_delay_in_millis() {
        let policy = policy_for(ROBOTS).unwrap();
        assert_eq!(policy.crawl_delay.as_millis(), 5000);
    }

    #[test]
    fn test_fractional_crawl_delay() {
        let policy = policy_for("User-agent: *\nCrawl-delay: 0.25\n").unwrap();
        assert_eq!(policy.crawl_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_fallback_delay_without_rules() {
        let policy = policy_for("").unwrap();
        assert_eq!(policy.crawl_delay, FALLBACK);
        assert!(policy.disallow.is_empty());
    }

    #[test]
    fn test_unparseable_crawl_delay_falls_back() {
        let policy = policy_for("User-agent: *\nCrawl-delay: soon\n").unwrap();
        assert_eq!(policy.crawl_delay, FALLBACK);
    }

    #[test]
    fn test_oversized_crawl_delay_falls_back() {
        for value in ["1e20", "-3", "inf", "NaN"] {
            let policy = policy_for(&format!("User-agent: *\nCrawl-delay: {}\n", value)).unwrap();
            assert_eq!(policy.crawl_delay, FALLBACK, "Crawl-delay: {}", value);
        }
    }

    #[test]
    fn test_disallow_strings_and_patterns() {
        let policy = policy_for(ROBOTS).unwrap();
        assert!(policy.disallow.exact().contains("https://www.test2.com/drafts"));
        assert_eq!(policy.disallow.exact().len(), 1);
        assert_eq!(
            policy.disallow.patterns()[0].as_str(),
            r"[a-zA-Z0-9_-]+\?s=bpage-next"
        );
    }

    #[test]
    fn test_relative_value_is_stored_raw() {
        let policy = policy_for("User-agent: *\nDisallow: tmp-files\n").unwrap();
        assert!(policy.disallow.exact().contains("tmp-files"));
    }

    #[test]
    fn test_site_prohibits_crawling() {
        let result = policy_for("User-agent: *\nDisallow: /\n");
        assert!(matches!(result, Err(CrawlError::CrawlingProhibited { .. })));
    }

    #[test]
    fn test_seed_url_disallowed() {
        let directives = wildcard_block("User-agent: *\nDisallow: /drafts\n");
        let result = build_policy(&directives, ROOT, "https://www.test2.com/drafts/one", FALLBACK);
        assert!(matches!(result, Err(CrawlError::SeedDisallowed { .. })));
    }

    #[test]
    fn test_seed_matching_wildcard_anywhere_is_disallowed() {
        // Wildcard rules are searched, not fully matched, for the seed too
        let directives = wildcard_block("User-agent: *\nDisallow: /drafts/*\n");
        let result = build_policy(&directives, ROOT, "https://www.test2.com/drafts/a/b", FALLBACK);
        assert!(matches!(result, Err(CrawlError::SeedDisallowed { .. })));

        let policy = build_policy(&directives, ROOT, "https://www.test2.com/published/a", FALLBACK);
        assert!(policy.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_robots_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ROBOTS))
            .mount(&server)
            .await;

        let text = fetch_robots_file(&Client::new(), &server.uri(), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some(ROBOTS));
    }

    #[tokio::test]
    async fn test_missing_robots_file_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let text = fetch_robots_file(&Client::new(), &server.uri(), Duration::from_secs(2))
            .await
            .unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fatal() {
        // Nothing listens on port 1
        let result =
            fetch_robots_file(&Client::new(), "http://127.0.0.1:1", Duration::from_secs(2)).await;
        assert!(matches!(result, Err(FetchError::HostUnreachable { .. })));
    }
}
