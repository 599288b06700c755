pub mod prompt;
pub mod suggestions;

pub use prompt::*;
pub use suggestions::*;
