use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkRankError>;

#[derive(Error, Debug)]
pub enum LinkRankError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] embeddings::EmbeddingError),

    #[error("Ranking error: {0}")]
    Rank(#[from] ranking::RankError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod crawler;
pub mod embeddings;
pub mod pipeline;
pub mod ranking;

#[cfg(test)]
mod test_support;
