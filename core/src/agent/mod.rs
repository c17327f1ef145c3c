pub mod context;
pub mod loop_;
pub mod observer;
pub mod parser;
pub mod registry;

pub use context::PromptBuilder;
pub use loop_::{DecisionLoop, EarlyStop};
pub use observer::{DecisionStep, NullObserver, StepKind, StepObserver};
pub use parser::Directive;
pub use registry::ToolRegistry;
