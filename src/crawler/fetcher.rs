//! Bounded-concurrency article fetching
//!
//! Every URL becomes one request future. At most `concurrency_limit` of them
//! are polled at a time, and their results are consumed in completion order
//! by a single aggregator loop that owns the progress counter. A failed
//! request is logged and dropped without touching its siblings.

use crate::crawler::source::{FetchError, FetchedPage, PageSource};
use crate::state::{ProgressReporter, ProgressTracker};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of one article request
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success(FetchedPage),

    /// Request failed; the URL is dropped from the run
    Failure {
        /// The URL that was requested
        url: String,
        /// Why it failed
        error: FetchError,
    },
}

/// Counts from one fetch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Fetches many URLs with a cap on simultaneous requests
pub struct ConcurrentFetcher {
    source: Arc<dyn PageSource>,
    concurrency_limit: usize,
    cancel: CancellationToken,
}

impl ConcurrentFetcher {
    /// Limit used when none is configured
    pub const DEFAULT_CONCURRENCY: usize = 50;

    pub fn new(source: Arc<dyn PageSource>, concurrency_limit: usize) -> Self {
        Self {
            source,
            concurrency_limit: concurrency_limit.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Ties the fetcher to a crawl-wide cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetches every URL and returns the successful pages
    ///
    /// The reporter is called once per finished request with a fixed total of
    /// `urls.len()`. Pages come back in completion order.
    pub async fn fetch_all<P>(&self, urls: &[String], progress: &P) -> Vec<FetchedPage>
    where
        P: ProgressReporter + ?Sized,
    {
        let mut pages = Vec::with_capacity(urls.len());
        self.fetch_each(
            stream::iter(urls.iter().cloned()),
            Some(urls.len()),
            progress,
            |page| pages.push(page),
        )
        .await;
        pages
    }

    /// Drives a stream of URLs through the bounded request pool
    ///
    /// `on_page` receives each successful page as soon as it completes.
    /// When `total` is `None` the total grows with the URLs pulled from the
    /// stream, and completion is only reported once the stream has ended.
    pub async fn fetch_each<St, P, F>(
        &self,
        urls: St,
        total: Option<usize>,
        progress: &P,
        mut on_page: F,
    ) -> FetchSummary
    where
        St: Stream<Item = String>,
        P: ProgressReporter + ?Sized,
        F: FnMut(FetchedPage),
    {
        let submitted = AtomicUsize::new(0);
        let exhausted = AtomicBool::new(false);
        let mut tracker = match total {
            Some(total) => ProgressTracker::new(total),
            None => ProgressTracker::open(),
        };
        let mut summary = FetchSummary::default();

        // A trailing `None` marks the end of the input stream
        let results = urls
            .map(Some)
            .chain(stream::once(future::ready(None)))
            .filter_map(|url| {
                if url.is_some() {
                    submitted.fetch_add(1, Ordering::Relaxed);
                } else {
                    exhausted.store(true, Ordering::Relaxed);
                }
                future::ready(url)
            })
            .map(|url| self.fetch_one(url))
            .buffer_unordered(self.concurrency_limit);
        futures::pin_mut!(results);

        let mut reported_done = false;
        while let Some(result) = results.next().await {
            if total.is_none() {
                tracker.submitted(submitted.load(Ordering::Relaxed));
                if exhausted.load(Ordering::Relaxed) {
                    tracker.close();
                }
            }
            let state = tracker.complete_one();
            reported_done = state.is_done();
            progress.report(state);

            match result {
                FetchResult::Success(page) => {
                    summary.succeeded += 1;
                    on_page(page);
                }
                FetchResult::Failure {
                    url,
                    error: FetchError::Cancelled,
                } => {
                    summary.cancelled += 1;
                    tracing::debug!("Cancelled before completion: {}", url);
                }
                FetchResult::Failure { url, error } => {
                    summary.failed += 1;
                    tracing::warn!("Problem fetching {}: {}", url, error);
                }
            }
        }

        summary.submitted = submitted.load(Ordering::Relaxed);

        // The end of the stream can be seen only after the last result
        if total.is_none() {
            tracker.submitted(summary.submitted);
            tracker.close();
        }
        let last = tracker.state();
        if !reported_done && last.completed > 0 && last.is_done() {
            progress.report(last);
        }

        tracing::info!(
            "Fetch pass finished: {} ok, {} failed, {} cancelled of {}",
            summary.succeeded,
            summary.failed,
            summary.cancelled,
            summary.submitted
        );
        summary
    }

    async fn fetch_one(&self, url: String) -> FetchResult {
        if self.cancel.is_cancelled() {
            return FetchResult::Failure {
                url,
                error: FetchError::Cancelled,
            };
        }

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.source.fetch(&url) => result,
        };

        match outcome {
            Ok(page) => FetchResult::Success(page),
            Err(error) => FetchResult::Failure { url, error },
        }
    }
}
