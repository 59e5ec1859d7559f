//! Wirecrawl: a news-wire archive crawler
//!
//! This crate walks the paginated archive of a news site, collects article
//! links per category, then fetches and parses every article concurrently
//! into structured records.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Wirecrawl operations
///
/// Per-article failures (fetch or parse) never surface here; they are
/// logged and counted by the crawler. This type covers the failures that
/// abort a whole run.
#[derive(Debug, Error)]
pub enum WirecrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Discovery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Wirecrawl operations
pub type Result<T> = std::result::Result<T, WirecrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ArticleLayout, ArticleRecord, Coordinator, CrawlReport};
pub use site::Category;
pub use state::ProgressState;
