pub mod category;
pub mod chat_session;
pub mod content_item;
pub mod search_query;
pub mod user_question;

pub use category::*;
pub use chat_session::*;
pub use content_item::*;
pub use search_query::*;
pub use user_question::*;
