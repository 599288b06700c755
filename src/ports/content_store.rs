use async_trait::async_trait;

use crate::domain::entities::{Category, ContentItem, RetrievedContent};
use crate::helper::error_chain_fmt;

/// A category label as stored, with how many items carry it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Read access to the knowledge base.
///
/// The serving path never writes content; seeding happens out of process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// The top `limit` items whose cosine similarity to `embedding` clears
    /// `threshold`, most similar first.
    async fn similarity_search(
        &self,
        embedding: &[f32],
        category_filter: &Option<String>,
        threshold: f64,
        limit: u16,
    ) -> Result<Vec<RetrievedContent>, ContentStoreError>;

    /// Distinct stored category labels with their item counts.
    async fn list_categories(&self) -> Result<Vec<CategoryCount>, ContentStoreError>;

    /// Every item of one category, ordered by Hebrew title.
    async fn list_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<ContentItem>, ContentStoreError>;
}

#[derive(thiserror::Error)]
pub enum ContentStoreError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for ContentStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
