pub mod extractor;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use ureq::Agent;
use url::Url;

pub use self::extractor::{extract_links, extract_text};

/// Configuration for fetching pages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User agent string to use for requests
    pub user_agent: String,
    /// Timeout for HTTP requests in seconds
    pub timeout_seconds: u64,
    /// Maximum number of redirects followed for a single fetch
    pub max_redirects: u32,
}

impl Default for CrawlerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            user_agent: "link-rank/0.1.0 (Relevance Crawler)".to_string(),
            timeout_seconds: 30,
            max_redirects: 10,
        }
    }
}

/// Raw content retrieved from a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The URL the document was requested from
    pub url: String,
    /// The response body
    pub html: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Fetch of {url} did not complete: {message}")]
    Aborted { url: String, message: String },
}

/// Capability to retrieve the content behind a URL.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError>;
}

/// HTTP client wrapper performing single-attempt GET requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: Agent,
    config: CrawlerConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    #[inline]
    pub fn new(config: CrawlerConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .max_redirects(config.max_redirects)
            .build()
            .into();

        Self { agent, config }
    }

    #[inline]
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Perform a blocking HTTP GET request
    #[inline]
    pub fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!("Making HTTP GET request to: {}", url);

        match self.agent.get(url).call() {
            Ok(mut response) => {
                let text =
                    response
                        .body_mut()
                        .read_to_string()
                        .map_err(|e| FetchError::Transport {
                            url: url.to_string(),
                            message: format!("failed to read response body: {}", e),
                        })?;
                debug!("Successfully read {} bytes from {}", text.len(), url);
                Ok(text)
            }
            Err(ureq::Error::StatusCode(status)) => {
                debug!("HTTP request failed with status {}: {}", status, url);
                Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Err(e) => {
                debug!("HTTP request failed with transport error: {}", e);
                Err(FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl Default for HttpClient {
    /// Create a new HTTP client with default configuration
    #[inline]
    fn default() -> Self {
        Self::new(CrawlerConfig::default())
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let client = self.clone();
        let target = url.to_string();
        let html = tokio::task::spawn_blocking(move || client.get(&target))
            .await
            .map_err(|e| FetchError::Aborted {
                url: url.to_string(),
                message: e.to_string(),
            })??;

        Ok(Document {
            url: url.to_string(),
            html,
        })
    }
}

/// Validate that a string is an absolute HTTP(S) URL with a host
#[inline]
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).with_context(|| format!("Invalid URL format: {}", url_str))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("URL must use HTTP or HTTPS scheme: {}", url_str));
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL must have a valid host: {}", url_str));
    }

    Ok(url)
}

/// Set of candidate URLs keyed by exact string equality.
///
/// Iteration follows first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    links: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, returning `false` if an identical string was already present
    #[inline]
    pub fn insert(&mut self, link: String) -> bool {
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.links.push(link);
        true
    }

    #[inline]
    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }
}

impl Extend<String> for LinkSet {
    #[inline]
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for link in iter {
            self.insert(link);
        }
    }
}

impl FromIterator<String> for LinkSet {
    #[inline]
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

/// Collects outbound links from a set of seed pages
#[derive(Clone)]
pub struct LinkAggregator {
    fetcher: Arc<dyn Fetcher>,
}

impl LinkAggregator {
    #[inline]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch every seed concurrently and union the links found on each page.
    ///
    /// A seed that cannot be fetched contributes no links; the remaining seeds
    /// are still aggregated.
    #[inline]
    pub async fn aggregate<S: AsRef<str> + Sync>(&self, seeds: &[S]) -> LinkSet {
        let fetches = seeds.iter().map(|seed| self.fetcher.fetch(seed.as_ref()));
        let outcomes = join_all(fetches).await;

        let mut links = LinkSet::new();
        let mut failed_seeds = 0_usize;

        for (seed, outcome) in seeds.iter().zip(outcomes) {
            match outcome {
                Ok(document) => {
                    let found = extract_links(&document.html);
                    debug!("Found {} links on seed {}", found.len(), seed.as_ref());
                    links.extend(found);
                }
                Err(e) => {
                    warn!("Skipping seed {}: {}", seed.as_ref(), e);
                    failed_seeds += 1;
                }
            }
        }

        info!(
            "Aggregated {} unique links from {} seeds ({} failed)",
            links.len(),
            seeds.len(),
            failed_seeds
        );
        links
    }
}
