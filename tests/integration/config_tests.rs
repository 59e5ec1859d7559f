//! Configuration loading against files on disk

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wirecrawl::config::{load_config, load_config_with_hash, PipelineMode};
use wirecrawl::{ArticleLayout, ConfigError};

#[test]
fn test_bundled_example_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("wirecrawl.example.toml");
    let config = load_config(&path).unwrap();

    assert_eq!(config.site.base_url, "https://uk.reuters.com");
    assert_eq!(config.site.page_size, 10);
    assert_eq!(config.crawler.concurrency_limit, 50);
    assert_eq!(config.crawler.layout, ArticleLayout::Plain);
    assert_eq!(config.crawler.pipeline, PipelineMode::Staged);
    assert_eq!(config.user_agent.pool.len(), 3);
    assert_eq!(
        config.output.url_file("worldnews"),
        Path::new("./data").join("worldnews_urls.txt")
    );
}

#[test]
fn test_hash_tracks_file_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wirecrawl.toml");

    fs::write(&path, "[crawler]\nconcurrency-limit = 10\n").unwrap();
    let (config, first) = load_config_with_hash(&path).unwrap();
    assert_eq!(config.crawler.concurrency_limit, 10);
    assert_eq!(first.len(), 64);

    fs::write(&path, "[crawler]\nconcurrency-limit = 20\n").unwrap();
    let (_, second) = load_config_with_hash(&path).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_out_of_range_concurrency_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wirecrawl.toml");
    fs::write(&path, "[crawler]\nconcurrency-limit = 0\n").unwrap();

    assert!(matches!(
        load_config(&path),
        Err(ConfigError::Validation(_))
    ));
}
