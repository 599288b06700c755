use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{ChatSession, ChatTurn};
use crate::helper::error_chain_fmt;

/// Persistence of conversation records.
///
/// Appending is the only mutation: turns already stored are never rewritten
/// or trimmed by the serving path. Concurrent appends to one session are
/// last-write-wins at the store, which is acceptable for advisory history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(&self, id: Uuid) -> Result<Option<ChatSession>, SessionStoreError>;

    async fn create_session(&self, session: &ChatSession) -> Result<(), SessionStoreError>;

    async fn append_turns(&self, id: Uuid, turns: &[ChatTurn]) -> Result<(), SessionStoreError>;
}

#[derive(thiserror::Error)]
pub enum SessionStoreError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl std::fmt::Debug for SessionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
