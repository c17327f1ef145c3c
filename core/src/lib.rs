pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod tools;
pub mod traits;
pub mod transport;

pub use agent::{
    DecisionLoop, DecisionStep, Directive, EarlyStop, NullObserver, PromptBuilder, StepKind,
    StepObserver, ToolRegistry,
};
pub use config::Config;
pub use error::{Error, Result, ToolError};
pub use providers::GroqProvider;
pub use session::{ExchangeHandler, GREETING, Role, Session, Turn};
pub use tools::{ArxivTool, WebSearchTool, WikipediaTool};
pub use traits::{ChatMessage, CompletionRequest, Provider, Tool};
pub use transport::TransportMode;
