use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::EmbeddingSettings;
use crate::helper::error_chain_fmt;
use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Embedding provider backed by the Hugging Face inference API.
///
/// One request per embedding, no retry loop: a failed call is classified and
/// reported so the caller can decide what degrades. The request timeout is
/// the only local protection against a slow upstream.
pub struct HostedEmbeddingClient {
    http_client: reqwest::Client,
    base_url: String,
    model_name: String,
    api_token: Secret<String>,
    dimension: usize,
}

impl HostedEmbeddingClient {
    pub fn new(settings: EmbeddingSettings) -> Result<Self, HostedEmbeddingClientError> {
        let timeout = settings.timeout();
        let api_token = settings
            .api_token
            .ok_or(HostedEmbeddingClientError::MissingApiToken)?;

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url,
            model_name: settings.model_name,
            api_token,
            dimension: settings.dimension,
        })
    }

    fn feature_extraction_url(&self) -> String {
        format!(
            "{}/models/{}/pipeline/feature-extraction",
            self.base_url, self.model_name
        )
    }
}

#[async_trait]
impl EmbeddingProvider for HostedEmbeddingClient {
    #[tracing::instrument(name = "Embedding text through the hosted provider", skip_all)]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .http_client
            .post(self.feature_extraction_url())
            .bearer_auth(self.api_token.expose_secret())
            .json(&FeatureExtractionRequest { inputs: text })
            .send()
            .await
            .map_err(classify_transport_error)?
            .error_for_status()
            .map_err(|e| EmbeddingError::Unavailable(e.into()))?;

        let payload: FeatureExtractionResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.into()))?;

        let embedding = payload.into_embedding()?;

        // The column is fixed-width; a wrong-size vector must never reach SQL.
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn classify_transport_error(error: reqwest::Error) -> EmbeddingError {
    if error.is_timeout() {
        EmbeddingError::Timeout(error.into())
    } else {
        EmbeddingError::Unavailable(error.into())
    }
}

#[derive(serde::Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// The inference API answers a single input with either a flat vector or a
/// one-element batch, depending on the model pipeline.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

impl FeatureExtractionResponse {
    fn into_embedding(self) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            FeatureExtractionResponse::Single(embedding) => Ok(embedding),
            FeatureExtractionResponse::Batch(mut batch) => {
                if batch.is_empty() {
                    return Err(EmbeddingError::Unavailable(anyhow::anyhow!(
                        "the provider returned an empty batch"
                    )));
                }
                Ok(batch.remove(0))
            }
        }
    }
}

#[derive(thiserror::Error)]
pub enum HostedEmbeddingClientError {
    #[error("embedding.api_token must be configured for the hosted backend")]
    MissingApiToken,
    #[error("Failed to build the HTTP client")]
    HttpClientError(#[from] reqwest::Error),
}

impl std::fmt::Debug for HostedEmbeddingClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
