//! Crawler coordinator - one crawl run for one category
//!
//! This module wires discovery, fetching and parsing together:
//! - Discovering article URLs, or reloading them from the category's URL file
//! - Fetching articles through the bounded request pool
//! - Parsing each page with the configured layout and dropping failures
//! - Enforcing the optional crawl deadline and external cancellation

use crate::config::{Config, PipelineMode};
use crate::crawler::discoverer::{Discoverer, Discovery, Termination};
use crate::crawler::fetcher::{ConcurrentFetcher, FetchSummary};
use crate::crawler::parser::{ArticleLayout, ArticleRecord};
use crate::crawler::source::{FetchedPage, HttpSource, PageSource};
use crate::site::Category;
use crate::state::{DiscoveredUrls, ProgressReporter};
use crate::storage::{load_urls, ForwardingSink, UrlFile};
use crate::WirecrawlError;
use chrono::{DateTime, Utc};
use futures::channel::mpsc;
use futures::stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What the discovery phase of a run produced
#[derive(Debug)]
pub struct DiscoverySummary {
    pub urls_found: usize,
    pub pages_visited: u32,
    pub termination: Termination,
}

impl DiscoverySummary {
    /// Splits a finished discovery into its summary and its URL set
    fn split(discovery: Discovery) -> (Self, DiscoveredUrls) {
        let Discovery {
            urls,
            pages_visited,
            termination,
        } = discovery;
        let summary = Self {
            urls_found: urls.len(),
            pages_visited,
            termination,
        };
        (summary, urls)
    }
}

/// Outcome of one crawl run
#[derive(Debug)]
pub struct CrawlReport {
    pub category: Category,
    pub layout: ArticleLayout,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Present when the run rediscovered URLs
    pub discovery: Option<DiscoverySummary>,

    pub fetch: FetchSummary,
    pub parse_failures: usize,

    /// Parsed articles, in fetch completion order
    pub records: Vec<ArticleRecord>,

    /// The run stopped early because of the deadline or a cancel request
    pub cancelled: bool,
}

impl CrawlReport {
    fn new(category: Category, layout: ArticleLayout) -> Self {
        let now = Utc::now();
        Self {
            category,
            layout,
            started_at: now,
            finished_at: now,
            discovery: None,
            fetch: FetchSummary::default(),
            parse_failures: 0,
            records: Vec::new(),
            cancelled: false,
        }
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Parses one fetched page into the report, counting failures
    fn absorb(&mut self, page: FetchedPage) {
        match self.layout.parse(&page.body, &page.final_url) {
            Ok(record) => self.records.push(record),
            Err(e) => {
                self.parse_failures += 1;
                tracing::warn!("Skipping {}: {}", page.url, e);
            }
        }
    }
}

/// Timer that cancels a run once its deadline passes; dropping it disarms it
struct Deadline(JoinHandle<()>);

impl Deadline {
    fn start(after: Duration, cancel: CancellationToken) -> Self {
        Self(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            tracing::warn!("Crawl deadline of {:?} reached, cancelling", after);
            cancel.cancel();
        }))
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    source: Arc<dyn PageSource>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(WirecrawlError)` - The HTTP client or user-agent pool could not be built
    pub fn new(config: Config) -> Result<Self, WirecrawlError> {
        let source = HttpSource::from_config(&config)?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Creates a coordinator over any page source
    pub fn with_source(config: Config, source: Arc<dyn PageSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
            cancel: CancellationToken::new(),
        }
    }

    /// Ties every run of this coordinator to an outside token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops every run of this coordinator when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs one crawl for `category`
    ///
    /// With `rediscover` the listing pages are walked again and the
    /// category's URL file is rewritten; otherwise the URL file from an
    /// earlier run is loaded. Per-article failures only show up as counts in
    /// the report.
    pub async fn run(
        &self,
        category: Category,
        rediscover: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<CrawlReport, WirecrawlError> {
        let cancel = self.cancel.child_token();
        let _deadline = self
            .config
            .crawler
            .crawl_deadline()
            .map(|after| Deadline::start(after, cancel.clone()));

        let mut report = CrawlReport::new(category, self.config.crawler.layout);
        tracing::info!(
            "Starting {} crawl (layout: {}, rediscover: {})",
            category,
            report.layout,
            rediscover
        );

        let streaming = rediscover && self.config.crawler.pipeline == PipelineMode::Streaming;
        if streaming {
            self.run_streaming(category, &cancel, progress, &mut report)
                .await?;
        } else {
            self.run_staged(category, rediscover, &cancel, progress, &mut report)
                .await?;
        }

        report.cancelled = cancel.is_cancelled();
        report.finished_at = Utc::now();
        tracing::info!(
            "Crawl of {} finished: {} records, {} fetch failures, {} parse failures in {}s",
            category,
            report.records.len(),
            report.fetch.failed,
            report.parse_failures,
            report.duration().num_seconds()
        );

        Ok(report)
    }

    /// Discover everything, fetch everything, then parse
    async fn run_staged(
        &self,
        category: Category,
        rediscover: bool,
        cancel: &CancellationToken,
        progress: &dyn ProgressReporter,
        report: &mut CrawlReport,
    ) -> Result<(), WirecrawlError> {
        let url_path = self.config.output.url_file(category.as_str());

        let urls = if rediscover {
            let sink = UrlFile::create(&url_path)?;
            let discovery = self
                .discoverer(cancel)?
                .discover(category, 1, sink)
                .await;
            let (summary, urls) = DiscoverySummary::split(discovery);
            report.discovery = Some(summary);
            urls
        } else {
            let urls = load_urls(&url_path)?;
            tracing::info!("Reusing {} URLs from {}", urls.len(), url_path.display());
            urls
        };

        let total = urls.len();
        let mut pages = Vec::with_capacity(total);
        report.fetch = self
            .fetcher(cancel)
            .fetch_each(
                stream::iter(urls.into_vec()),
                Some(total),
                progress,
                |page| pages.push(page),
            )
            .await;

        for page in pages {
            report.absorb(page);
        }
        Ok(())
    }

    /// Discovery feeds the fetcher through a bounded channel; pages are
    /// parsed as they arrive
    async fn run_streaming(
        &self,
        category: Category,
        cancel: &CancellationToken,
        progress: &dyn ProgressReporter,
        report: &mut CrawlReport,
    ) -> Result<(), WirecrawlError> {
        let url_path = self.config.output.url_file(category.as_str());
        let (tx, rx) = mpsc::channel(self.config.crawler.channel_capacity);
        let sink = ForwardingSink::new(UrlFile::create(&url_path)?, tx);

        let discoverer = self.discoverer(cancel)?;
        let discovery_task =
            tokio::spawn(async move { discoverer.discover(category, 1, sink).await });

        let fetch = self
            .fetcher(cancel)
            .fetch_each(rx, None, progress, |page| report.absorb(page))
            .await;
        report.fetch = fetch;

        let (summary, _) = DiscoverySummary::split(discovery_task.await?);
        report.discovery = Some(summary);
        Ok(())
    }

    fn discoverer(&self, cancel: &CancellationToken) -> Result<Discoverer, WirecrawlError> {
        Ok(
            Discoverer::from_config(self.source.clone(), &self.config.site)?
                .with_cancellation(cancel.clone()),
        )
    }

    fn fetcher(&self, cancel: &CancellationToken) -> ConcurrentFetcher {
        ConcurrentFetcher::new(self.source.clone(), self.config.crawler.concurrency_limit)
            .with_cancellation(cancel.clone())
    }
}
