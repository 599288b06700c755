pub mod chat;
pub mod health_check;
pub mod search;
pub mod sections;
pub mod suggestions;

pub use chat::*;
pub use health_check::*;
pub use search::*;
pub use sections::*;
pub use suggestions::*;
