use std::sync::Arc;

use tracing::error;

use crate::configuration::RagSettings;
use crate::domain::entities::{ContentItem, SearchQuery, SearchQueryError};
use crate::helper::error_chain_fmt;
use crate::ports::{ContentStore, EmbeddingProvider};

#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<ContentItem>,
    pub total: usize,
}

#[derive(thiserror::Error)]
pub enum SearchContentError {
    #[error(transparent)]
    InvalidQuery(#[from] SearchQueryError),
}

impl std::fmt::Debug for SearchContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Semantic search over the knowledge base: the query is embedded and matched
/// with the same vector search the chat orchestrator uses, with its own
/// result limit and an optional category filter. No language model involved.
///
/// A search is advisory, so provider or store failures degrade to an empty
/// result set. Only an invalid query is an error.
pub struct SearchContentUseCase {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    content_store: Arc<dyn ContentStore>,
    rag: RagSettings,
}

impl SearchContentUseCase {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        content_store: Arc<dyn ContentStore>,
        rag: RagSettings,
    ) -> SearchContentUseCase {
        SearchContentUseCase {
            embedding_provider,
            content_store,
            rag,
        }
    }

    #[tracing::instrument(name = "Searching the knowledge base", skip(self))]
    pub async fn execute(
        &self,
        query: &str,
        category: Option<String>,
    ) -> Result<SearchOutcome, SearchContentError> {
        let query = SearchQuery::parse(query)?;

        let embedding = match self.embedding_provider.embed(query.as_ref()).await {
            Ok(embedding) => embedding,
            Err(error) => {
                error!(?error, "Failed to embed the search query");
                return Ok(SearchOutcome {
                    results: Vec::new(),
                    total: 0,
                });
            }
        };

        let results = match self
            .content_store
            .similarity_search(
                &embedding,
                &category,
                self.rag.match_threshold,
                self.rag.search_result_limit,
            )
            .await
        {
            Ok(retrieved) => retrieved
                .into_iter()
                .map(|retrieved| retrieved.item)
                .collect::<Vec<ContentItem>>(),
            Err(error) => {
                error!(?error, "Failed to search the knowledge base");
                Vec::new()
            }
        };

        Ok(SearchOutcome {
            total: results.len(),
            results,
        })
    }
}
