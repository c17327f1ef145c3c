use crate::agent::{DecisionLoop, NullObserver, StepObserver};
use crate::transport::{self, TransportMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Seed turn every session starts with.
pub const GREETING: &str = "Hi, I'm a chatbot who can search the web. How can I help you?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message in the conversation record. Immutable once
/// appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The append-only conversation record for one interactive session.
/// Seeded with the greeting; after N exchanges it holds exactly
/// 2N + 1 turns in insertion order. Lives only until the process exits.
pub struct Session {
    turns: Vec<Turn>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(GREETING)],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

/// The single writer of the turn store. One `send` is one exchange: the
/// user turn goes in, one decision-loop run is issued through the
/// transport shim, and exactly one assistant turn comes back — the
/// final answer, or one prefixed error message when the run failed.
pub struct ExchangeHandler {
    decision_loop: Arc<DecisionLoop>,
    mode: TransportMode,
    history: bool,
    observer: Arc<dyn StepObserver>,
}

impl ExchangeHandler {
    pub fn new(decision_loop: Arc<DecisionLoop>) -> Self {
        Self {
            decision_loop,
            mode: TransportMode::Direct,
            history: true,
            observer: Arc::new(NullObserver),
        }
    }

    pub fn with_transport(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether prior turns are replayed as context for the loop.
    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history = enabled;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub async fn send(&self, session: &mut Session, text: &str) -> String {
        session.append(Turn::user(text));

        let history = if self.history {
            // Everything before the turn just appended, greeting included.
            session.turns[..session.turns.len() - 1].to_vec()
        } else {
            Vec::new()
        };

        let outcome = transport::run_loop(
            self.mode,
            self.decision_loop.clone(),
            text.to_string(),
            history,
            self.observer.clone(),
        )
        .await;

        let reply = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                error!("exchange failed: {}", e);
                format!("Error: {}", e)
            }
        };

        session.append(Turn::assistant(reply.clone()));
        reply
    }
}
