//! Request-level entry point tying link discovery to relevance ranking


use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::crawler::{Fetcher, HttpClient, LinkAggregator, validate_url};
use crate::embeddings::{Embedder, OllamaClient};
use crate::ranking::{RankedResult, Ranker, RankerConfig};
use crate::{LinkRankError, Result};

/// Crawls one hop out from a set of seed pages and ranks what it finds
pub struct CrawlPipeline {
    aggregator: LinkAggregator,
    ranker: Ranker,
}

impl CrawlPipeline {
    #[inline]
    pub fn new(fetcher: Arc<dyn Fetcher>, embedder: Arc<dyn Embedder>, config: RankerConfig) -> Self {
        Self {
            aggregator: LinkAggregator::new(Arc::clone(&fetcher)),
            ranker: Ranker::new(fetcher, embedder, config),
        }
    }

    /// Build a pipeline backed by HTTP fetching and the configured Ollama server
    #[inline]
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let fetcher = Arc::new(HttpClient::new(config.crawler.clone()));
        let embedder = OllamaClient::new(&config.ollama)?
            .with_timeout(Duration::from_secs(config.ranker.candidate_timeout_secs));

        Ok(Self::new(fetcher, Arc::new(embedder), config.ranker.clone()))
    }

    /// Discover every link on the seed pages and rank them against `query`.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkRankError::InvalidRequest`] for an empty query, an
    /// empty seed list or a seed that is not an absolute http(s) URL, and
    /// with [`LinkRankError::Rank`] when the query cannot be embedded.
    #[inline]
    pub async fn search<S: AsRef<str> + Sync>(&self, query: &str, seeds: &[S]) -> Result<RankedResult> {
        if query.trim().is_empty() {
            return Err(LinkRankError::InvalidRequest(
                "query must not be empty".to_string(),
            ));
        }

        if seeds.is_empty() {
            return Err(LinkRankError::InvalidRequest(
                "at least one seed URL is required".to_string(),
            ));
        }

        for seed in seeds {
            let seed = seed.as_ref();
            validate_url(seed)
                .with_context(|| format!("Invalid seed URL: {}", seed))
                .map_err(|e| LinkRankError::InvalidRequest(format!("{:#}", e)))?;
        }

        let links = self.aggregator.aggregate(seeds).await;
        if links.is_empty() {
            warn!("No links found on {} seed pages", seeds.len());
            return Ok(RankedResult::default());
        }

        info!("Found {} unique links across {} seeds", links.len(), seeds.len());
        Ok(self.ranker.rank(&links, query).await?)
    }
}

/// Flatten seed arguments, splitting comma separated lists and dropping blanks
#[inline]
pub fn parse_seed_list<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split(','))
        .map(str::trim)
        .filter(|seed| !seed.is_empty())
        .map(ToString::to_string)
        .collect()
}
