use crate::agent::{DecisionLoop, StepObserver};
use crate::error::{Error, Result};
use crate::session::Turn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the decision loop's underlying run is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Await the loop on the calling task.
    Direct,
    /// Move the identical run onto one spawned task and await its
    /// completion before continuing. Exists to keep the caller's
    /// surroundings responsive, not to run anything concurrently.
    Delegated,
}

/// Issue one decision-loop run. Strictly sequential from the caller's
/// point of view in both modes: no second run starts until this one has
/// returned. A delegated task failure surfaces as `Error::Transport`.
pub async fn run_loop(
    mode: TransportMode,
    decision_loop: Arc<DecisionLoop>,
    query: String,
    history: Vec<Turn>,
    observer: Arc<dyn StepObserver>,
) -> Result<String> {
    match mode {
        TransportMode::Direct => decision_loop.run(&query, &history, observer.as_ref()).await,
        TransportMode::Delegated => {
            let handle = tokio::spawn(async move {
                decision_loop
                    .run(&query, &history, observer.as_ref())
                    .await
            });

            handle
                .await
                .map_err(|e| Error::transport(format!("delegated run failed: {}", e)))?
        }
    }
}
