use thiserror::Error;

/// Errors that terminate a chat exchange. Everything else the decision
/// loop encounters (unreachable tools, unparsable model output) is
/// absorbed into the run transcript and never surfaces here.
#[derive(Debug, Error)]
pub enum Error {
    /// The session is not usable at all, e.g. no API key configured.
    /// Reported before the decision loop starts.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The model provider call itself failed. Always fatal to the
    /// current run.
    #[error("transport error: {0}")]
    Transport(String),

    /// Iteration budget spent without a final answer, under the
    /// `EarlyStop::Error` policy.
    #[error("no final answer after {iterations} iterations")]
    LoopExhausted { iterations: usize },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Faults local to a single tool invocation. The decision loop records
/// these as observations and keeps going.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("tool unavailable: {0}")]
    Unavailable(String),

    #[error("no tool named '{0}'")]
    NotFound(String),
}
