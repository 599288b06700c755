use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::configuration::RagSettings;
use crate::domain::entities::{
    ChatSession, ChatTurn, Platform, RetrievedContent, SourceReference, UserQuestion,
    UserQuestionError,
};
use crate::domain::services::prompt::{build_answer_messages, compose_context};
use crate::domain::services::suggestions::{
    build_suggestion_messages, fallback_suggestions, parse_suggestions,
};
use crate::helper::error_chain_fmt;
use crate::ports::{
    CompletionError, CompletionProvider, ContentStore, EmbeddingError, EmbeddingProvider,
    SessionStore,
};

/// Served instead of an answer when the model replies with empty content.
/// The exchange is still recorded in the session.
const EMPTY_ANSWER_FALLBACK: &str = "מצטער, לא הצלחתי ליצור תשובה. נסה שוב.";

/// Served instead of an answer when the completion call fails outright.
const FAILED_ANSWER_FALLBACK: &str = "מצטער, אירעה שגיאה בעיבוד השאלה. נסה שוב בעוד רגע.";

#[derive(Debug)]
pub struct AnsweredQuestion {
    pub answer: String,
    pub sources: Vec<SourceReference>,
    pub session_id: Uuid,
    pub suggested_questions: Vec<String>,
}

#[derive(thiserror::Error)]
pub enum AnswerQuestionError {
    #[error(transparent)]
    InvalidQuestion(#[from] UserQuestionError),
    #[error(transparent)]
    EmbeddingFailed(#[from] EmbeddingError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AnswerQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Answers one user question with retrieval-augmented generation.
///
/// The question is embedded, matched against the knowledge base, and answered
/// by the language model with the retrieved sections injected into its system
/// prompt and the latest session turns replayed as history. Retrieval,
/// persistence and follow-up suggestions all degrade without failing the
/// request: only an invalid question or a failed embedding aborts it.
pub struct AnswerQuestionUseCase {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    completion_provider: Arc<dyn CompletionProvider>,
    content_store: Arc<dyn ContentStore>,
    session_store: Arc<dyn SessionStore>,
    rag: RagSettings,
    max_completion_tokens: u32,
    suggestion_max_completion_tokens: u32,
}

impl AnswerQuestionUseCase {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        completion_provider: Arc<dyn CompletionProvider>,
        content_store: Arc<dyn ContentStore>,
        session_store: Arc<dyn SessionStore>,
        rag: RagSettings,
        max_completion_tokens: u32,
        suggestion_max_completion_tokens: u32,
    ) -> AnswerQuestionUseCase {
        AnswerQuestionUseCase {
            embedding_provider,
            completion_provider,
            content_store,
            session_store,
            rag,
            max_completion_tokens,
            suggestion_max_completion_tokens,
        }
    }

    #[tracing::instrument(name = "Answering a user question", skip(self))]
    pub async fn execute(
        &self,
        question: &str,
        session_id: Option<&str>,
        platform: Platform,
    ) -> Result<AnsweredQuestion, AnswerQuestionError> {
        let question = UserQuestion::parse(question)?;

        let embedding = self.embedding_provider.embed(question.as_ref()).await?;

        let retrieved = self.retrieve_sources(&embedding).await;
        let context = compose_context(&retrieved, self.rag.context_chars_per_source);
        info!(
            nb_sources = retrieved.len(),
            "Retrieved knowledge base sources"
        );

        let session = self.resolve_session(session_id, platform).await;

        let messages = build_answer_messages(
            &question,
            &context,
            session.recent_turns(self.rag.history_window),
        );
        let answer = match self
            .completion_provider
            .complete(&messages, self.max_completion_tokens)
            .await
        {
            Ok(answer) => answer,
            Err(CompletionError::EmptyCompletion) => {
                warn!("The completion came back empty, serving the fallback answer");
                EMPTY_ANSWER_FALLBACK.to_string()
            }
            Err(error) => {
                error!(?error, "Failed to generate an answer, serving the fallback");
                FAILED_ANSWER_FALLBACK.to_string()
            }
        };

        let turns = [
            ChatTurn::user(question.as_ref()),
            ChatTurn::assistant(answer.clone()),
        ];
        let (suggested_questions, append_outcome) = tokio::join!(
            self.suggest_follow_ups(question.as_ref(), &answer),
            self.session_store.append_turns(session.id, &turns),
        );
        if let Err(error) = append_outcome {
            error!(?error, "Failed to record the conversation turns");
        }

        Ok(AnsweredQuestion {
            answer,
            sources: retrieved.iter().map(SourceReference::from).collect(),
            session_id: session.id,
            suggested_questions,
        })
    }

    /// A retrieval failure degrades to an empty context: the assistant then
    /// answers from general knowledge instead of failing the request.
    async fn retrieve_sources(&self, embedding: &[f32]) -> Vec<RetrievedContent> {
        match self
            .content_store
            .similarity_search(
                embedding,
                &None,
                self.rag.match_threshold,
                self.rag.match_count,
            )
            .await
        {
            Ok(retrieved) => retrieved,
            Err(error) => {
                error!(?error, "Failed to search the knowledge base");
                Vec::new()
            }
        }
    }

    /// Reuses the caller's session when its id parses and is known, otherwise
    /// mints a fresh one. A failed lookup or insert is logged and the
    /// conversation carries on without stored history.
    async fn resolve_session(&self, session_id: Option<&str>, platform: Platform) -> ChatSession {
        if let Some(raw_id) = session_id {
            match raw_id.parse::<Uuid>() {
                Ok(id) => match self.session_store.find_session(id).await {
                    Ok(Some(session)) => {
                        info!(session_id = %session.id, "Continuing an existing session");
                        return session;
                    }
                    Ok(None) => info!("Unknown session id, starting a fresh session"),
                    Err(error) => {
                        error!(?error, "Failed to load the session, starting a fresh one")
                    }
                },
                Err(_) => info!("Malformed session id, starting a fresh session"),
            }
        }

        let session = ChatSession::builder().platform(platform).build();
        if let Err(error) = self.session_store.create_session(&session).await {
            error!(?error, "Failed to persist the new session");
        }
        session
    }

    /// Follow-up questions are advisory: any failure or unparseable
    /// completion falls back to the static list.
    async fn suggest_follow_ups(&self, question: &str, answer: &str) -> Vec<String> {
        let messages = build_suggestion_messages(question, answer);
        match self
            .completion_provider
            .complete(&messages, self.suggestion_max_completion_tokens)
            .await
        {
            Ok(raw) => {
                let suggestions = parse_suggestions(&raw);
                if suggestions.is_empty() {
                    fallback_suggestions()
                } else {
                    suggestions
                }
            }
            Err(error) => {
                warn!(?error, "Failed to generate follow-up questions");
                fallback_suggestions()
            }
        }
    }
}
