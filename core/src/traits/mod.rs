pub mod provider;
pub mod tool;

pub use provider::{ChatMessage, CompletionRequest, Provider};
pub use tool::Tool;
