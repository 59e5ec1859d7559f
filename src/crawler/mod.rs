//! Crawler module for article discovery, fetching and parsing
//!
//! This module contains the core crawling logic, including:
//! - Listing pagination with duplicate-based termination
//! - Bounded-concurrency article fetching with progress reporting
//! - Article parsing under an explicit layout
//! - Overall crawl coordination

mod coordinator;
mod discoverer;
mod fetcher;
mod parser;
mod source;


pub use coordinator::{Coordinator, CrawlReport, DiscoverySummary};
pub use discoverer::{Discoverer, Discovery, DiscoveryError, Termination};
pub use fetcher::{ConcurrentFetcher, FetchResult, FetchSummary};
pub use parser::{ArticleLayout, ArticleRecord, ParseError};
pub use source::{build_http_client, is_document, FetchError, FetchedPage, HttpSource, PageSource};

use crate::config::Config;
use crate::output;
use crate::site::Category;
use crate::state::ProgressReporter;
use crate::WirecrawlError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl for one category and writes its record file
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client and user-agent pool
/// 2. Discover article URLs, or reload the persisted URL file
/// 3. Fetch and parse every article
/// 4. Write the CSV record file for the category
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `category` - Archive section to crawl
/// * `rediscover` - Walk the listing pages again instead of reusing the URL file
/// * `cancel` - Stops the crawl early; records parsed so far are still written
/// * `progress` - Receives a snapshot as each article request completes
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; per-article failures are counted inside
/// * `Err(WirecrawlError)` - Setup, URL file or record file failure
pub async fn crawl_category(
    config: Config,
    category: Category,
    rediscover: bool,
    cancel: CancellationToken,
    progress: &dyn ProgressReporter,
) -> Result<CrawlReport, WirecrawlError> {
    let record_path = config.output.record_file(category.as_str());
    let coordinator = Coordinator::new(config)?.with_cancellation(cancel);
    let report = coordinator.run(category, rediscover, progress).await?;
    output::write_records(&record_path, &report.records)?;
    Ok(report)
}
