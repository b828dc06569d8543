// src/main.rs
// =============================================================================
// This is the entry point of the crawler.
//
// What happens here:
// 1. Set up logging (stderr, RUST_LOG aware)
// 2. Parse command-line arguments, prompting for anything missing
// 3. Start a multi-threaded runtime sized to the requested concurrency
// 4. Crawl the site and print the site map
// 5. Exit with proper code (0 = success, 2 = the crawl was terminated)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod policy;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, CrawlArgs};
use config::CrawlConfig;
use crawl::SiteMap;
use serde::Serialize;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let exit_code = match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays machine readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let args = Cli::parse().resolve()?;

    let mut config = CrawlConfig::new(args.concurrency, args.delay)?;
    if let Some(user_agent) = &args.user_agent {
        config = config.with_user_agent(user_agent.clone());
    }

    // The worker pool is capped regardless of the requested concurrency
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let started = Instant::now();
    let site_map = runtime.block_on(crawl::begin_crawl(&args.seed_url, &config))?;

    print_site_map(&site_map, &args, started.elapsed().as_secs_f64())?;
    eprintln!("\nCompleted in {:.2?}.", started.elapsed());
    Ok(())
}

// JSON shape of a finished crawl
#[derive(Serialize)]
struct CrawlReport<'a> {
    seed_url: &'a str,
    pages: usize,
    duration_secs: f64,
    site_map: &'a SiteMap,
}

fn print_site_map(site_map: &SiteMap, args: &CrawlArgs, duration_secs: f64) -> Result<()> {
    if args.json {
        let report = CrawlReport {
            seed_url: &args.seed_url,
            pages: site_map.len(),
            duration_secs,
            site_map,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(site_map);
    }
    Ok(())
}

// One block per page, its links indented underneath
fn print_table(site_map: &SiteMap) {
    for (page, links) in site_map {
        println!("{} ({} link(s))", page, links.len());
        for link in links {
            println!("    -> {}", link);
        }
    }

    let total_links: usize = site_map.values().map(|links| links.len()).sum();
    println!();
    println!("Summary:");
    println!("   Pages crawled: {}", site_map.len());
    println!("   Links found: {}", total_links);
}
