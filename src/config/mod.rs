//! Configuration module for Wirecrawl
//!
//! Loads an immutable, typed configuration from a TOML file and validates it
//! before any crawling starts.
//!
//! # Example
//!
//! ```no_run
//! use wirecrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wirecrawl.toml")).unwrap();
//! println!("Fetching {} articles at a time", config.crawler.concurrency_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, PipelineMode, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
