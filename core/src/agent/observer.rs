/// What one loop iteration amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    ToolCall,
    ParsingError,
    FinalAnswer,
}

/// One cycle of the decision loop, emitted to the observer as it
/// happens. Ephemeral: steps exist for live display only and are not
/// persisted beyond the run.
#[derive(Debug, Clone)]
pub struct DecisionStep {
    pub kind: StepKind,
    pub thought: Option<String>,
    pub action: Option<String>,
    pub action_input: Option<String>,
    pub observation: Option<String>,
}

/// Callback for live progress display. Called once per iteration; must
/// not block indefinitely, since the loop waits on it.
pub trait StepObserver: Send + Sync {
    fn on_step(&self, step: &DecisionStep);
}

/// Observer for headless runs.
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn on_step(&self, _step: &DecisionStep) {}
}
