use async_trait::async_trait;

use crate::helper::error_chain_fmt;

/// Turns text into vectors of the fixed dimension shared with the
/// `vector` column of `guide_content`.
///
/// Exactly one implementation is wired at startup: the hosted inference API
/// client, or the in-process model when compiled with `local-embeddings`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Dimensionality of every vector `embed` returns.
    fn dimension(&self) -> usize;
}

#[derive(thiserror::Error)]
pub enum EmbeddingError {
    #[error("The embedding request timed out")]
    Timeout(#[source] anyhow::Error),
    #[error("The embedding provider is unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error("The embedding provider returned a vector of dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl std::fmt::Debug for EmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
