use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::{Platform, SourceReference};
use crate::helper::error_chain_fmt;
use crate::ports::EmbeddingError;
use crate::use_cases::{AnswerQuestionError, AnswerQuestionUseCase};

#[derive(Debug, serde::Deserialize)]
pub struct ChatBodyData {
    pub question: String,
    pub session_id: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct ChatResponseData {
    pub answer: String,
    pub sources: Vec<SourceReference>,
    pub session_id: Uuid,
    pub suggested_questions: Vec<String>,
}

#[tracing::instrument(name = "Chat with the travel guide", skip(use_case, body))]
pub async fn chat(
    use_case: web::Data<AnswerQuestionUseCase>,
    body: web::Json<ChatBodyData>,
) -> Result<HttpResponse, ChatError> {
    let answered = use_case
        .execute(&body.question, body.session_id.as_deref(), Platform::Web)
        .await
        .map_err(|error| match error {
            AnswerQuestionError::InvalidQuestion(ref invalid) => {
                ChatError::InvalidQuestion(invalid.to_string())
            }
            AnswerQuestionError::EmbeddingFailed(EmbeddingError::Timeout(_)) => {
                ChatError::Overloaded(error.into())
            }
            AnswerQuestionError::EmbeddingFailed(_) => ChatError::AiUnavailable(error.into()),
            AnswerQuestionError::UnexpectedError(e) => ChatError::InternalError(e),
        })?;

    info!(session_id = %answered.session_id, "Successfully answered the question");
    Ok(HttpResponse::Ok().json(ChatResponseData {
        answer: answered.answer,
        sources: answered.sources,
        session_id: answered.session_id,
        suggested_questions: answered.suggested_questions,
    }))
}

#[derive(thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidQuestion(String),
    #[error("השירות עמוס. נסה שוב בעוד רגע.")]
    Overloaded(#[source] anyhow::Error),
    #[error("שירות ה-AI זמנית לא זמין. נסה שוב.")]
    AiUnavailable(#[source] anyhow::Error),
    #[error("שגיאה בעיבוד השאלה. נסה שוב.")]
    InternalError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            ChatError::InvalidQuestion(_) => StatusCode::BAD_REQUEST,
            ChatError::Overloaded(_) => StatusCode::GATEWAY_TIMEOUT,
            ChatError::AiUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from chat controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
