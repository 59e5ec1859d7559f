use crate::storage::traits::{StorageError, StorageResult, UrlSink};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::SinkExt;

/// Persists each URL through an inner sink, then hands it to a bounded
/// channel
///
/// The channel send waits while the channel is full, which holds discovery
/// back until the consumer catches up.
pub struct ForwardingSink<S> {
    inner: S,
    tx: mpsc::Sender<String>,
}

impl<S: UrlSink> ForwardingSink<S> {
    pub fn new(inner: S, tx: mpsc::Sender<String>) -> Self {
        Self { inner, tx }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: UrlSink> UrlSink for ForwardingSink<S> {
    async fn record(&mut self, url: &str) -> StorageResult<()> {
        self.inner.record(url).await?;
        self.tx
            .send(url.to_string())
            .await
            .map_err(|_| StorageError::ChannelClosed(url.to_string()))
    }
}
