pub mod similarity;


use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use self::similarity::{DimensionMismatchError, cosine_similarity};
use crate::crawler::{FetchError, Fetcher, LinkSet, extract_text};
use crate::embeddings::{EmbeddingError, Embedder};

/// Score given to a candidate that could not be evaluated
pub const FAILURE_SCORE: f32 = -1.0;

/// Configuration for candidate evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RankerConfig {
    /// Maximum number of candidates evaluated at the same time
    pub max_concurrency: usize,
    /// Upper bound on fetching, embedding and scoring one candidate
    pub candidate_timeout_secs: u64,
    /// Page text beyond this many characters is not embedded
    pub max_page_chars: usize,
}

impl Default for RankerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            candidate_timeout_secs: 60,
            max_page_chars: 8_000,
        }
    }
}

/// A candidate URL paired with its relevance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub link: String,
    pub similarity: f32,
}

impl ScoredCandidate {
    #[inline]
    pub fn failed(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            similarity: FAILURE_SCORE,
        }
    }
}

/// Candidates ordered by descending similarity.
///
/// Serializes as a plain list of `{ "link", "similarity" }` records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResult {
    candidates: Vec<ScoredCandidate>,
}

impl RankedResult {
    /// Order candidates by descending score.
    ///
    /// The sort is stable, so equal scores keep their input order.
    #[inline]
    pub fn from_unsorted(mut candidates: Vec<ScoredCandidate>) -> Self {
        candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Self { candidates }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredCandidate> {
        self.candidates.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[ScoredCandidate] {
        &self.candidates
    }

    /// Keep only the `limit` best candidates
    #[inline]
    pub fn truncate(&mut self, limit: usize) {
        self.candidates.truncate(limit);
    }

    #[inline]
    pub fn into_vec(self) -> Vec<ScoredCandidate> {
        self.candidates
    }
}

impl IntoIterator for RankedResult {
    type Item = ScoredCandidate;
    type IntoIter = std::vec::IntoIter<ScoredCandidate>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

#[derive(Debug, Error)]
pub enum RankError {
    #[error("Failed to embed query: {0}")]
    QueryEmbedding(#[source] EmbeddingError),
}

/// Reasons a single candidate ends up with [`FAILURE_SCORE`]
#[derive(Debug, Error)]
enum CandidateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("page has no visible text")]
    EmptyContent,

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Dimension(#[from] DimensionMismatchError),

    #[error("similarity is not a finite number")]
    NonFiniteScore,

    #[error("evaluation exceeded {0:?}")]
    Timeout(Duration),
}

/// Scores candidate pages against a query
#[derive(Clone)]
pub struct Ranker {
    fetcher: Arc<dyn Fetcher>,
    embedder: Arc<dyn Embedder>,
    config: RankerConfig,
}

impl Ranker {
    #[inline]
    pub fn new(fetcher: Arc<dyn Fetcher>, embedder: Arc<dyn Embedder>, config: RankerConfig) -> Self {
        Self {
            fetcher,
            embedder,
            config,
        }
    }

    /// Rank every candidate by the similarity of its page text to `query`.
    ///
    /// Candidates are evaluated concurrently. A candidate that cannot be
    /// fetched, has no text, or cannot be embedded in time still appears in the
    /// result with [`FAILURE_SCORE`]. Ties keep the iteration order of
    /// `candidates`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::QueryEmbedding`] if the query itself cannot be embedded.
    #[inline]
    pub async fn rank(&self, candidates: &LinkSet, query: &str) -> Result<RankedResult, RankError> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RankError::QueryEmbedding)?;
        let query_embedding = query_embedding.as_slice();

        info!(
            "Ranking {} candidates (concurrency {})",
            candidates.len(),
            self.config.max_concurrency
        );

        // `buffered` yields in input order, which keeps the tie order stable
        let scored: Vec<ScoredCandidate> = stream::iter(candidates.iter())
            .map(|link| self.evaluate(link, query_embedding))
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let failures = scored
            .iter()
            .filter(|candidate| candidate.similarity == FAILURE_SCORE)
            .count();
        info!(
            "Ranked {} candidates, {} could not be evaluated",
            scored.len(),
            failures
        );

        Ok(RankedResult::from_unsorted(scored))
    }

    async fn evaluate(&self, link: &str, query_embedding: &[f32]) -> ScoredCandidate {
        let timeout = Duration::from_secs(self.config.candidate_timeout_secs);
        let outcome = tokio::time::timeout(timeout, self.score(link, query_embedding))
            .await
            .unwrap_or_else(|_| Err(CandidateError::Timeout(timeout)));

        match outcome {
            Ok(similarity) => {
                debug!("Scored {}: {:.4}", link, similarity);
                ScoredCandidate {
                    link: link.to_string(),
                    similarity,
                }
            }
            Err(e) => {
                warn!("Could not evaluate {}: {}", link, e);
                ScoredCandidate::failed(link)
            }
        }
    }

    async fn score(&self, link: &str, query_embedding: &[f32]) -> Result<f32, CandidateError> {
        let document = self.fetcher.fetch(link).await?;

        let text = extract_text(&document.html);
        if text.is_empty() {
            return Err(CandidateError::EmptyContent);
        }

        let text = truncate_chars(&text, self.config.max_page_chars);
        let embedding = self.embedder.embed(text).await?;

        let similarity = cosine_similarity(query_embedding, &embedding)?;
        if !similarity.is_finite() {
            return Err(CandidateError::NonFiniteScore);
        }

        Ok(similarity)
    }
}

/// Cut `text` to at most `max_chars` characters without splitting a character
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices().nth(max_chars).map_or(
        text,
        #[expect(clippy::string_slice, reason = "index comes from char_indices")]
        |(index, _)| &text[..index],
    )
}
