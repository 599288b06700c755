use async_trait::async_trait;
use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModelType,
};
use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};
use tokio::{sync::oneshot, task};
use tracing::info;

use crate::helper::error_chain_fmt;
use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Message type for the internal channel: the text to embed and a sender for
/// the resulting vector.
type RunnerMessage = (String, oneshot::Sender<Result<Vec<f32>, String>>);

/// Embedding provider running a sentence-embeddings model inside this
/// process, for development without an inference API credential.
///
/// The model is not `Send`, and encoding is CPU-bound work that must stay
/// off the async runtime, so it lives on a dedicated thread fed through a
/// bounded channel.
pub struct LocalEmbeddings {
    sender_to_runner: mpsc::SyncSender<RunnerMessage>,
    dimension: usize,
    _thread_handle: JoinHandle<()>,
}

impl LocalEmbeddings {
    /// Spawns the model runner and waits until the model is loaded and has
    /// reported its dimension, which must match the stored vector column.
    pub async fn spawn(expected_dimension: usize) -> Result<Self, LocalEmbeddingsError> {
        let (sender, receiver) = mpsc::sync_channel(100);
        let (ready_sender, ready_receiver) = oneshot::channel();
        let handle = thread::spawn(move || Self::runner(receiver, ready_sender));

        let dimension = ready_receiver
            .await
            .map_err(|_| LocalEmbeddingsError::RunnerStopped)?
            .map_err(LocalEmbeddingsError::ModelError)?;

        if dimension != expected_dimension {
            return Err(LocalEmbeddingsError::DimensionMismatch {
                expected: expected_dimension,
                got: dimension,
            });
        }

        Ok(Self {
            sender_to_runner: sender,
            dimension,
            _thread_handle: handle,
        })
    }

    /// The model runner itself.
    ///
    /// Maps texts to a 384 dimensional dense vector space with
    /// all-MiniLM-L12-v2. A failed encode answers its caller and keeps the
    /// runner alive; the runner only exits when every sender is gone.
    #[tracing::instrument(name = "Embeddings runner", skip_all)]
    fn runner(receiver: mpsc::Receiver<RunnerMessage>, ready: oneshot::Sender<Result<usize, String>>) {
        let model = match SentenceEmbeddingsBuilder::remote(SentenceEmbeddingsModelType::AllMiniLmL12V2)
            .create_model()
        {
            Ok(model) => model,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        let dimension = match model.get_embedding_dim() {
            Ok(dimension) => dimension as usize,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        info!(dimension, "Embeddings model loaded");
        if ready.send(Ok(dimension)).is_err() {
            return;
        }

        while let Ok((text, reply)) = receiver.recv() {
            let result = model
                .encode(&[text])
                .map_err(|e| e.to_string())
                .and_then(|mut embeddings| {
                    if embeddings.is_empty() {
                        Err("the model returned no embedding".to_string())
                    } else {
                        Ok(embeddings.remove(0))
                    }
                });

            let _ = reply.send(result);
        }
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddings {
    #[tracing::instrument(name = "Embedding text with the local model", skip_all)]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let (sender, receiver) = oneshot::channel();

        // The bounded channel can block when the runner is backed up.
        task::block_in_place(|| self.sender_to_runner.send((text.to_string(), sender)))
            .map_err(|e| EmbeddingError::Unavailable(anyhow::anyhow!("{}", e)))?;

        let embedding = receiver
            .await
            .map_err(|_| {
                EmbeddingError::Unavailable(anyhow::anyhow!(
                    "the embedding runner dropped the request"
                ))
            })?
            .map_err(|model_error| EmbeddingError::Unavailable(anyhow::anyhow!(model_error)))?;

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

#[derive(thiserror::Error)]
pub enum LocalEmbeddingsError {
    #[error("Failed to load the sentence-embeddings model: {0}")]
    ModelError(String),
    #[error("The embedding runner stopped before reporting readiness")]
    RunnerStopped,
    #[error("The local model embeds into dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl std::fmt::Debug for LocalEmbeddingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
