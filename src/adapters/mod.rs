pub mod groq_completion_client;
pub mod hosted_embedding_client;
#[cfg(feature = "local-embeddings")]
pub mod local_embeddings;

pub use groq_completion_client::*;
pub use hosted_embedding_client::*;
#[cfg(feature = "local-embeddings")]
pub use local_embeddings::*;
