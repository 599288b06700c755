pub mod answer_question;
pub mod search_content;

pub use answer_question::*;
pub use search_content::*;
