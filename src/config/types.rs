use crate::crawler::ArticleLayout;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Browser user agents used when the config file does not list its own pool
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
];

/// Main configuration structure for Wirecrawl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host that listing paths and article hrefs are resolved against
    pub base_url: String,

    /// Number of stories requested per listing page
    pub page_size: u32,

    /// Hard stop for pagination, if set
    pub max_pages: Option<u32>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://uk.reuters.com".to_string(),
            page_size: 10,
            max_pages: None,
        }
    }
}

/// How discovery and fetching are chained within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Discover everything, then fetch everything, then parse
    #[default]
    Staged,
    /// Feed discovered URLs to the fetcher through a bounded channel
    Streaming,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of article requests in flight at once
    pub concurrency_limit: usize,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Wall-clock budget for a whole run (seconds); unbounded when absent
    pub crawl_deadline_secs: Option<u64>,

    /// Markup variant used to turn article pages into records
    pub layout: ArticleLayout,

    pub pipeline: PipelineMode,

    /// Capacity of the discovery-to-fetch channel in streaming mode
    pub channel_capacity: usize,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn crawl_deadline(&self) -> Option<Duration> {
        self.crawl_deadline_secs.map(Duration::from_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 50,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            crawl_deadline_secs: None,
            layout: ArticleLayout::Plain,
            pipeline: PipelineMode::Staged,
            channel_capacity: 64,
        }
    }
}

/// User agent rotation pool
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Candidate `User-Agent` values; one is drawn at random per request
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding the per-category discovered URL files
    pub url_dir: String,

    /// Directory under which per-category record folders are created
    pub record_dir: String,
}

impl OutputConfig {
    /// Path of the newline-delimited URL file for a category
    pub fn url_file(&self, category: &str) -> PathBuf {
        PathBuf::from(&self.url_dir).join(format!("{}_urls.txt", category))
    }

    /// Path of the CSV record file for a category
    pub fn record_file(&self, category: &str) -> PathBuf {
        PathBuf::from(&self.record_dir)
            .join(format!("{}_data", category))
            .join("articles.csv")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            url_dir: "./data".to_string(),
            record_dir: ".".to_string(),
        }
    }
}
