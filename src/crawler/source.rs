//! HTTP page source
//!
//! This module handles every network request the crawler makes:
//! - Building the HTTP client with request and connect timeouts
//! - Drawing a `User-Agent` from the rotation pool per request
//! - Classifying failures (status, timeout, connection, non-document body)

use crate::config::{Config, CrawlerConfig};
use crate::site::UserAgentPool;
use crate::WirecrawlError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use thiserror::Error;

/// Why a single request produced no usable document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("not a text document (content-type {content_type})")]
    ContentMismatch { content_type: String },

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("cancelled")]
    Cancelled,
}

/// A document that was fetched successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Anything that can turn a URL into a document body
///
/// The crawler only talks to the network through this trait, which keeps
/// discovery and fetching independent of the HTTP stack.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with the configured timeouts
///
/// Redirects are followed; the final URL is reported on the fetched page.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageSource` backed by `reqwest`
pub struct HttpSource {
    client: Client,
    agents: UserAgentPool,
}

impl HttpSource {
    pub fn new(client: Client, agents: UserAgentPool) -> Self {
        Self { client, agents }
    }

    /// Builds the client and user-agent pool described by `config`
    pub fn from_config(config: &Config) -> Result<Self, WirecrawlError> {
        let client = build_http_client(&config.crawler)?;
        let agents = UserAgentPool::from_config(&config.user_agent)?;
        Ok(Self::new(client, agents))
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.agents.pick())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_document(&content_type) {
            return Err(FetchError::ContentMismatch { content_type });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Returns false for downloadable resources (PDFs, images, archives)
///
/// A missing Content-Type is given the benefit of the doubt.
pub fn is_document(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty() || content_type.contains("text") || content_type.contains("html")
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}
