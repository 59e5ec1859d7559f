//! Storage traits and error types
//!
//! This module defines the sink interface discovery writes URLs through and
//! the errors storage operations can raise.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("URL file not found: {}", .0.display())]
    UrlFileMissing(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL channel closed before {0} could be forwarded")]
    ChannelClosed(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for newly discovered article URLs
///
/// Discovery calls `record` once per URL, immediately after it is first
/// seen, so an implementation that persists synchronously keeps everything
/// found up to a crash.
#[async_trait]
pub trait UrlSink: Send {
    async fn record(&mut self, url: &str) -> StorageResult<()>;
}

/// Collects URLs in memory
#[async_trait]
impl UrlSink for Vec<String> {
    async fn record(&mut self, url: &str) -> StorageResult<()> {
        self.push(url.to_string());
        Ok(())
    }
}

#[async_trait]
impl<S: UrlSink + ?Sized> UrlSink for &mut S {
    async fn record(&mut self, url: &str) -> StorageResult<()> {
        (**self).record(url).await
    }
}
