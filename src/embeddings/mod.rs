// Embeddings module
// Turns text into fixed-length vectors for semantic comparison

pub mod ollama;

use async_trait::async_trait;
use thiserror::Error;

pub use ollama::OllamaClient;

/// A fixed-length numeric representation of a piece of text
pub type EmbeddingVector = Vec<f32>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Input of {length} characters exceeds the limit of {limit}")]
    InputTooLarge { length: usize, limit: usize },

    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding backend rejected the request: HTTP {0}")]
    Rejected(u16),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("Expected a {expected}-dimensional embedding, got {actual}")]
    UnexpectedDimension { expected: usize, actual: usize },
}

/// Capability to embed text.
///
/// An embedder is initialized once and shared across concurrent callers, so
/// implementations must be safe to invoke from many tasks at the same time.
/// The same text must map to the same vector for the lifetime of the embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}
