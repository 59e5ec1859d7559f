//! Storage module for persisting discovered URLs
//!
//! This module handles:
//! - The append-only, per-category URL file written during discovery
//! - Loading a persisted URL file to skip rediscovery
//! - Forwarding discovered URLs into the streaming fetch stage

mod forward;
mod traits;
mod url_file;

pub use forward::ForwardingSink;
pub use traits::{StorageError, StorageResult, UrlSink};
pub use url_file::{load_urls, UrlFile};
