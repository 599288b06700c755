pub mod completion_provider;
pub mod content_store;
pub mod embedding_provider;
pub mod session_store;

pub use completion_provider::*;
pub use content_store::*;
pub use embedding_provider::*;
pub use session_store::*;
