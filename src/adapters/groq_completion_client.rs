use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::CompletionSettings;
use crate::domain::services::prompt::ChatMessage;
use crate::helper::error_chain_fmt;
use crate::ports::{CompletionError, CompletionProvider};

/// Completion provider speaking the OpenAI-compatible chat API exposed by
/// Groq.
///
/// Sampling parameters come from configuration and never change per request.
/// Streaming is disabled: callers get the whole answer as one JSON response.
pub struct GroqCompletionClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    model_name: String,
    temperature: f32,
    top_p: f32,
    reasoning_effort: String,
}

impl GroqCompletionClient {
    pub fn new(settings: CompletionSettings) -> Result<Self, GroqCompletionClientError> {
        let timeout = settings.timeout();
        let api_key = settings
            .api_key
            .ok_or(GroqCompletionClientError::MissingApiKey)?;

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url,
            api_key,
            model_name: settings.model_name,
            temperature: settings.temperature,
            top_p: settings.top_p,
            reasoning_effort: settings.reasoning_effort,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for GroqCompletionClient {
    #[tracing::instrument(
        name = "Requesting a chat completion",
        skip_all,
        fields(message_count = messages.len(), max_completion_tokens)
    )]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_completion_tokens: u32,
    ) -> Result<String, CompletionError> {
        let request_body = ChatCompletionRequest {
            model: &self.model_name,
            messages,
            temperature: self.temperature,
            max_completion_tokens,
            top_p: self.top_p,
            reasoning_effort: &self.reasoning_effort,
            stream: false,
        };

        let response = self
            .http_client
            .post(self.chat_completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?
            .error_for_status()
            .map_err(|e| CompletionError::Unavailable(e.into()))?;

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Unavailable(e.into()))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        // Reasoning models sometimes burn the whole token budget on
        // reasoning and answer with nothing.
        if content.trim().is_empty() {
            return Err(CompletionError::EmptyCompletion);
        }

        Ok(content)
    }
}

fn classify_transport_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Timeout(error.into())
    } else {
        CompletionError::Unavailable(error.into())
    }
}

#[derive(serde::Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    reasoning_effort: &'a str,
    stream: bool,
}

#[derive(serde::Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(serde::Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(serde::Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(thiserror::Error)]
pub enum GroqCompletionClientError {
    #[error("completion.api_key must be configured")]
    MissingApiKey,
    #[error("Failed to build the HTTP client")]
    HttpClientError(#[from] reqwest::Error),
}

impl std::fmt::Debug for GroqCompletionClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
