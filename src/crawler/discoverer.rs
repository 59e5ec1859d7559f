//! Listing pagination and article URL discovery
//!
//! Pages are walked one at a time, since whether page N+1 holds anything new
//! is only known after page N. Discovery ends the first time a page adds no
//! URL to the set, or immediately when a page cannot be fetched or read.

use crate::config::SiteConfig;
use crate::crawler::source::{FetchError, PageSource};
use crate::site::{extract_article_links, listing_url, Category, ListingError};
use crate::state::DiscoveredUrls;
use crate::storage::{StorageError, UrlSink};
use crate::WirecrawlError;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Failure that stops pagination, tagged with the page it happened on
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("listing page {page} ({url}) could not be fetched: {source}")]
    Fetch {
        page: u32,
        url: String,
        source: FetchError,
    },

    #[error("listing page {page} could not be read: {source}")]
    Listing { page: u32, source: ListingError },

    #[error("URL found on listing page {page} could not be stored: {source}")]
    Sink { page: u32, source: StorageError },
}

impl DiscoveryError {
    /// The listing page index that failed
    pub fn page(&self) -> u32 {
        match self {
            DiscoveryError::Fetch { page, .. }
            | DiscoveryError::Listing { page, .. }
            | DiscoveryError::Sink { page, .. } => *page,
        }
    }
}

/// Why pagination stopped
#[derive(Debug)]
pub enum Termination {
    /// `page` contributed no new URL
    Exhausted { page: u32 },
    /// The configured page cap was reached after `page`
    PageLimit { page: u32 },
    /// Cancelled before `page` completed
    Cancelled { page: u32 },
    /// A page failed; URLs found before it are kept
    Failed(DiscoveryError),
}

/// Result of one discovery run
#[derive(Debug)]
pub struct Discovery {
    pub urls: DiscoveredUrls,
    /// Listing pages fetched and read successfully
    pub pages_visited: u32,
    pub termination: Termination,
}

/// Walks the listing pages of one category
#[derive(Clone)]
pub struct Discoverer {
    source: Arc<dyn PageSource>,
    base_url: Url,
    page_size: u32,
    max_pages: Option<u32>,
    cancel: CancellationToken,
}

impl Discoverer {
    pub fn new(source: Arc<dyn PageSource>, base_url: Url, page_size: u32) -> Self {
        Self {
            source,
            base_url,
            page_size,
            max_pages: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Builds a discoverer for the `[site]` section of the config
    pub fn from_config(
        source: Arc<dyn PageSource>,
        config: &SiteConfig,
    ) -> Result<Self, WirecrawlError> {
        let base_url = Url::parse(&config.base_url)?;
        let mut discoverer = Self::new(source, base_url, config.page_size);
        discoverer.max_pages = config.max_pages;
        Ok(discoverer)
    }

    /// Caps the number of listing pages fetched per run
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collects every article URL of `category`, starting at `start_page`
    ///
    /// Each URL is handed to `sink` the moment it is first seen. Pagination
    /// problems never surface as an `Err`: they end the walk and are
    /// reported in `Discovery::termination` next to the URLs found so far.
    pub async fn discover<S: UrlSink>(
        &self,
        category: Category,
        start_page: u32,
        mut sink: S,
    ) -> Discovery {
        let mut urls = DiscoveredUrls::new();
        let mut pages_visited = 0;
        let mut page = start_page.max(1);

        tracing::info!("Discovering {} articles from page {}", category, page);

        let termination = 'pages: loop {
            let url = listing_url(&self.base_url, category, page, self.page_size);

            let fetched = if self.cancel.is_cancelled() {
                Err(FetchError::Cancelled)
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
                    result = self.source.fetch(url.as_str()) => result,
                }
            };

            let body = match fetched {
                Ok(fetched) => fetched.body,
                Err(FetchError::Cancelled) => break Termination::Cancelled { page },
                Err(source) => {
                    break Termination::Failed(DiscoveryError::Fetch {
                        page,
                        url: url.to_string(),
                        source,
                    })
                }
            };

            let links = match extract_article_links(&body, &self.base_url) {
                Ok(links) => links,
                Err(source) => break Termination::Failed(DiscoveryError::Listing { page, source }),
            };

            let before = urls.len();
            for link in links {
                if urls.contains(&link) {
                    continue;
                }
                if let Err(source) = sink.record(&link).await {
                    break 'pages Termination::Failed(DiscoveryError::Sink { page, source });
                }
                urls.insert(link);
            }
            pages_visited += 1;

            tracing::debug!(
                "Listing page {}: {} new URLs, {} total",
                page,
                urls.len() - before,
                urls.len()
            );

            if urls.len() == before {
                break Termination::Exhausted { page };
            }
            if self.max_pages.is_some_and(|max| pages_visited >= max) {
                break Termination::PageLimit { page };
            }
            page += 1;
        };

        match &termination {
            Termination::Exhausted { page } => tracing::info!(
                "Discovery finished: {} URLs, page {} added nothing new",
                urls.len(),
                page
            ),
            Termination::PageLimit { page } => tracing::info!(
                "Discovery stopped at page limit ({}): {} URLs",
                page,
                urls.len()
            ),
            Termination::Cancelled { page } => tracing::warn!(
                "Discovery cancelled at page {}: {} URLs kept",
                page,
                urls.len()
            ),
            Termination::Failed(error) => tracing::error!(
                "Discovery stopped at page {}: {} ({} URLs kept)",
                error.page(),
                error,
                urls.len()
            ),
        }

        Discovery {
            urls,
            pages_visited,
            termination,
        }
    }
}
