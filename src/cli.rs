// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl needs three values: the seed url, the concurrency and the
// fallback crawl delay. They can be given as flags; anything missing is asked
// for interactively on stdin, re-asking until the answer is valid.
// =============================================================================

use crate::config::{MAX_CONCURRENCY, MAX_FALLBACK_DELAY_SECS, MIN_CONCURRENCY};
use crate::crawl::root_url;
use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl every page of a site and map each page to the links it contains",
    long_about = "site-crawler starts from a seed url, follows every same-origin link, \
                  and honors the site's robots.txt (crawl delay and disallow rules)."
)]
pub struct Cli {
    /// The url to start the crawl from (e.g., https://example.com)
    #[arg(long)]
    pub seed_url: Option<String>,

    /// Pages fetched concurrently per batch. Between 1 and 100
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=100))]
    pub concurrency: Option<u64>,

    /// Delay between page crawls in seconds if not set by host. Between 0.00 and 200.00
    #[arg(long, value_parser = parse_delay)]
    pub delay: Option<f64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Output the site map as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Fully resolved arguments, after prompting for anything missing
#[derive(Debug, Clone)]
pub struct CrawlArgs {
    pub seed_url: String,
    pub concurrency: usize,
    pub delay: f64,
    pub user_agent: Option<String>,
    pub json: bool,
}

impl Cli {
    // Fills in missing values by prompting.
    pub fn resolve(self) -> Result<CrawlArgs> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        self.resolve_with(&mut input, &mut output)
    }

    fn resolve_with<R: BufRead, W: Write>(self, input: &mut R, output: &mut W) -> Result<CrawlArgs> {
        let seed_url = match self.seed_url {
            Some(url) => {
                validate_seed(&url).map_err(|e| anyhow!(e))?;
                url
            }
            None => prompt(input, output, "Enter seed url", |s| {
                validate_seed(s).map(|_| s.to_string())
            })?,
        };

        let concurrency = match self.concurrency {
            Some(value) => value as usize,
            None => prompt(input, output, "Enter concurrency per crawler", parse_concurrency)?,
        };

        let delay = match self.delay {
            Some(value) => value,
            None => prompt(
                input,
                output,
                "Set fallback crawl delay in seconds and milliseconds",
                parse_delay,
            )?,
        };

        Ok(CrawlArgs {
            seed_url,
            concurrency,
            delay,
            user_agent: self.user_agent,
            json: self.json,
        })
    }
}

// Asks until `parse` accepts the answer. EOF is an error.
fn prompt<T, R, W, F>(input: &mut R, output: &mut W, question: &str, parse: F) -> Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<T, String>,
{
    loop {
        write!(output, "{}: ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(anyhow!("no input given for '{}'", question));
        }

        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(message) => writeln!(output, "{} Please try again.", message)?,
        }
    }
}

fn validate_seed(value: &str) -> Result<(), String> {
    root_url(value).map(|_| ()).map_err(|e| e.to_string())
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
    let concurrency = usize::from_str(value).map_err(|e| format!("'{}': {}.", value, e))?;
    if (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
        Ok(concurrency)
    } else {
        Err(format!(
            "Concurrency must be between {} and {}.",
            MIN_CONCURRENCY, MAX_CONCURRENCY
        ))
    }
}

fn parse_delay(value: &str) -> Result<f64, String> {
    let delay = f64::from_str(value).map_err(|e| format!("'{}': {}.", value, e))?;
    if delay.is_finite() && (0.0..=MAX_FALLBACK_DELAY_SECS).contains(&delay) {
        Ok(delay)
    } else {
        Err(format!(
            "Delay must be between 0.00 and {:.2} seconds.",
            MAX_FALLBACK_DELAY_SECS
        ))
    }
}
