use crate::agent::parser::{self, Directive};
use crate::agent::{DecisionStep, PromptBuilder, StepKind, StepObserver, ToolRegistry};
use crate::error::{Error, Result};
use crate::session::Turn;
use crate::traits::{ChatMessage, CompletionRequest, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_MAX_ITERATIONS: usize = 15;
const DEFAULT_TEMPERATURE: f64 = 0.7;

const PARSING_ERROR_NUDGE: &str = "Observation: that reply did not follow the format. \
Reply with either Thought/Action/Action Input or a Final Answer.";

/// What to do when the iteration budget runs out without a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyStop {
    /// Fail the run with `Error::LoopExhausted`.
    Error,
    /// Synthesize an answer from the last observation.
    BestEffort,
}

/// The bounded ReAct cycle that turns a user query into a final answer.
///
/// Each iteration asks the provider for the next move, parses the reply
/// into a directive, and either invokes a tool (appending the
/// observation to the transcript) or returns the final answer. Tool
/// failures and unparsable replies are recorded as observations and the
/// loop continues; only provider failures and budget exhaustion under
/// `EarlyStop::Error` end the run with an error.
pub struct DecisionLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    prompt: PromptBuilder,
    max_iterations: usize,
    early_stop: EarlyStop,
    temperature: f64,
}

impl DecisionLoop {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        let prompt = PromptBuilder::new(tools.catalog());
        Self {
            provider,
            tools,
            prompt,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            early_stop: EarlyStop::BestEffort,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_early_stop(mut self, policy: EarlyStop) -> Self {
        self.early_stop = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn run(
        &self,
        query: &str,
        history: &[Turn],
        observer: &dyn StepObserver,
    ) -> Result<String> {
        let mut messages = self.prompt.build_messages(history, query);
        let mut last_observation: Option<String> = None;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;

            let request = CompletionRequest {
                messages: &messages,
                temperature: self.temperature,
            };
            let reply = self.provider.complete(request).await?;
            let thought = parser::thought(&reply);

            match parser::parse(&reply) {
                Directive::FinalAnswer(answer) => {
                    debug!(iterations, "final answer produced");
                    observer.on_step(&DecisionStep {
                        kind: StepKind::FinalAnswer,
                        thought,
                        action: None,
                        action_input: None,
                        observation: Some(answer.clone()),
                    });
                    return Ok(answer);
                }
                Directive::ToolCall { name, input } => {
                    let observation = match self.tools.invoke(&name, &input).await {
                        Ok(text) => text,
                        // Absorbed: the model sees the failure text and
                        // can try another tool or another query.
                        Err(e) => {
                            warn!(tool = %name, "tool invocation failed: {}", e);
                            e.to_string()
                        }
                    };

                    observer.on_step(&DecisionStep {
                        kind: StepKind::ToolCall,
                        thought,
                        action: Some(name),
                        action_input: Some(input),
                        observation: Some(observation.clone()),
                    });

                    messages.push(ChatMessage::assistant(reply));
                    messages.push(ChatMessage::user(format!("Observation: {}", observation)));
                    last_observation = Some(observation);
                }
                Directive::Unparsable(raw) => {
                    warn!(iterations, "model reply did not match the grammar");
                    observer.on_step(&DecisionStep {
                        kind: StepKind::ParsingError,
                        thought,
                        action: None,
                        action_input: None,
                        observation: Some(raw.clone()),
                    });

                    messages.push(ChatMessage::assistant(raw));
                    messages.push(ChatMessage::user(PARSING_ERROR_NUDGE.to_string()));
                }
            }
        }

        match self.early_stop {
            EarlyStop::BestEffort => Ok(best_effort_answer(last_observation)),
            EarlyStop::Error => Err(Error::LoopExhausted {
                iterations: self.max_iterations,
            }),
        }
    }
}

fn best_effort_answer(last_observation: Option<String>) -> String {
    match last_observation {
        Some(observation) => format!(
            "I ran out of reasoning steps before reaching a confident answer. \
             The most relevant thing I found was: {}",
            observation
        ),
        None => "I ran out of reasoning steps before finding anything useful.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::NullObserver;
    use crate::error::ToolError;
    use crate::traits::Tool;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that replays a fixed list of replies, then repeats the
    /// last one. Records the messages of the most recent request.
    struct ScriptedProvider {
        replies: Vec<String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| r.to_string()).collect(),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String> {
            *self.seen.lock().unwrap() = request.messages.to_vec();
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            let idx = idx.min(self.replies.len() - 1);
            Ok(self.replies[idx].clone())
        }
    }

    struct CountingTool {
        invocations: AtomicUsize,
        result: Result<String, ToolError>,
    }

    impl CountingTool {
        fn returning(text: &str) -> Self {
            Self {
                invocations: AtomicUsize::new(0),
                result: Ok(text.to_string()),
            }
        }

        fn unavailable(message: &str) -> Self {
            Self {
                invocations: AtomicUsize::new(0),
                result: Err(ToolError::Unavailable(message.to_string())),
            }
        }
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "lookup"
        }

        fn description(&self) -> &str {
            "A scripted lookup"
        }

        async fn invoke(&self, _query: &str) -> Result<String, ToolError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct RecordingObserver {
        steps: Mutex<Vec<DecisionStep>>,
    }

    impl RecordingObserver {
        fn new() -> Self {
            Self {
                steps: Mutex::new(Vec::new()),
            }
        }

        fn kinds(&self) -> Vec<StepKind> {
            self.steps.lock().unwrap().iter().map(|s| s.kind).collect()
        }
    }

    impl StepObserver for RecordingObserver {
        fn on_step(&self, step: &DecisionStep) {
            self.steps.lock().unwrap().push(step.clone());
        }
    }

    fn registry_with(tool: Arc<dyn Tool>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(tool);
        Arc::new(registry)
    }

    #[tokio::test]
    async fn no_tool_query_completes_in_one_iteration() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Thought: no lookup needed\nFinal Answer: two plus two is four",
        ]));
        let tool = Arc::new(CountingTool::returning("unused"));
        let loop_ = DecisionLoop::new(provider.clone(), registry_with(tool.clone()));

        let answer = loop_.run("what is 2+2?", &[], &NullObserver).await.unwrap();

        assert_eq!(answer, "two plus two is four");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tool.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_call_then_final_answer() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Thought: need to look this up\nAction: lookup\nAction Input: rust",
            "Thought: I now know the final answer\nFinal Answer: found it",
        ]));
        let tool = Arc::new(CountingTool::returning("Rust is a systems language."));
        let observer = RecordingObserver::new();
        let loop_ = DecisionLoop::new(provider, registry_with(tool.clone()));

        let answer = loop_.run("what is rust?", &[], &observer).await.unwrap();

        assert_eq!(answer, "found it");
        assert_eq!(tool.invocations.load(Ordering::SeqCst), 1);
        assert_eq!(
            observer.kinds(),
            vec![StepKind::ToolCall, StepKind::FinalAnswer]
        );

        let steps = observer.steps.lock().unwrap();
        assert_eq!(steps[0].action.as_deref(), Some("lookup"));
        assert_eq!(
            steps[0].observation.as_deref(),
            Some("Rust is a systems language.")
        );
    }

    #[tokio::test]
    async fn malformed_reply_is_absorbed_then_run_succeeds() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "sure, let me just ramble instead of following the format",
            "Final Answer: recovered",
        ]));
        let observer = RecordingObserver::new();
        let loop_ = DecisionLoop::new(
            provider,
            registry_with(Arc::new(CountingTool::returning("unused"))),
        );

        let answer = loop_.run("question", &[], &observer).await.unwrap();

        assert_eq!(answer, "recovered");
        assert_eq!(
            observer.kinds(),
            vec![StepKind::ParsingError, StepKind::FinalAnswer]
        );
    }

    #[tokio::test]
    async fn unavailable_tool_is_absorbed() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Action: lookup\nAction Input: anything",
            "Final Answer: done without it",
        ]));
        let tool = Arc::new(CountingTool::unavailable("endpoint unreachable"));
        let observer = RecordingObserver::new();
        let loop_ = DecisionLoop::new(provider, registry_with(tool));

        let answer = loop_.run("question", &[], &observer).await.unwrap();

        assert_eq!(answer, "done without it");
        let steps = observer.steps.lock().unwrap();
        assert!(
            steps[0]
                .observation
                .as_deref()
                .unwrap()
                .contains("endpoint unreachable")
        );
    }

    #[tokio::test]
    async fn unknown_tool_name_is_absorbed() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Action: telescope\nAction Input: stars",
            "Final Answer: fine",
        ]));
        let observer = RecordingObserver::new();
        let loop_ = DecisionLoop::new(
            provider,
            registry_with(Arc::new(CountingTool::returning("unused"))),
        );

        let answer = loop_.run("question", &[], &observer).await.unwrap();

        assert_eq!(answer, "fine");
        let steps = observer.steps.lock().unwrap();
        assert!(
            steps[0]
                .observation
                .as_deref()
                .unwrap()
                .contains("telescope")
        );
    }

    #[tokio::test]
    async fn exhaustion_under_error_policy_fails() {
        let provider = Arc::new(ScriptedProvider::new(&["not a valid reply"]));
        let loop_ = DecisionLoop::new(
            provider.clone(),
            registry_with(Arc::new(CountingTool::returning("unused"))),
        )
        .with_max_iterations(3)
        .with_early_stop(EarlyStop::Error);

        let err = loop_.run("question", &[], &NullObserver).await.unwrap_err();

        assert!(matches!(err, Error::LoopExhausted { iterations: 3 }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_under_best_effort_uses_last_observation() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Action: lookup\nAction Input: anything",
        ]));
        let tool = Arc::new(CountingTool::returning("a partial fact"));
        let loop_ = DecisionLoop::new(provider, registry_with(tool))
            .with_max_iterations(2)
            .with_early_stop(EarlyStop::BestEffort);

        let answer = loop_.run("question", &[], &NullObserver).await.unwrap();

        assert!(answer.contains("a partial fact"));
    }

    #[tokio::test]
    async fn history_is_included_when_given_and_absent_when_not() {
        let replies = ["Final Answer: ok"];
        let history = vec![
            Turn::user("earlier question"),
            Turn::assistant("earlier answer"),
        ];

        let aware = Arc::new(ScriptedProvider::new(&replies));
        let loop_ = DecisionLoop::new(
            aware.clone(),
            registry_with(Arc::new(CountingTool::returning("unused"))),
        );
        loop_.run("query", &history, &NullObserver).await.unwrap();
        let seen = aware.seen.lock().unwrap();
        assert!(seen.iter().any(|m| m.content == "earlier question"));
        assert!(seen.iter().any(|m| m.content == "earlier answer"));
        drop(seen);

        let unaware = Arc::new(ScriptedProvider::new(&replies));
        let loop_ = DecisionLoop::new(
            unaware.clone(),
            registry_with(Arc::new(CountingTool::returning("unused"))),
        );
        loop_.run("query", &[], &NullObserver).await.unwrap();
        let seen = unaware.seen.lock().unwrap();
        assert!(!seen.iter().any(|m| m.content == "earlier question"));
    }
}
