use async_trait::async_trait;

use crate::domain::services::prompt::ChatMessage;
use crate::helper::error_chain_fmt;

/// Runs one chat completion against the language model and returns the
/// assistant text.
///
/// Sampling parameters (model, temperature, top_p, reasoning effort) are
/// fixed per process from configuration; only the token cap varies between
/// the answer call and the cheaper suggestion call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_completion_tokens: u32,
    ) -> Result<String, CompletionError>;
}

#[derive(thiserror::Error)]
pub enum CompletionError {
    #[error("The completion request timed out")]
    Timeout(#[source] anyhow::Error),
    #[error("The completion provider is unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error("The completion provider returned no content")]
    EmptyCompletion,
}

impl std::fmt::Debug for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
