pub mod content_postgres_repository;
pub mod session_postgres_repository;

pub use content_postgres_repository::*;
pub use session_postgres_repository::*;
