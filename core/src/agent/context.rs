use crate::session::{Role, Turn};
use crate::traits::ChatMessage;
use std::fmt::Write;

/// Assembles the message list for one provider call: the ReAct system
/// prompt with the tool catalog, then prior turns (when the session is
/// history-aware), then the current query. The loop appends this run's
/// step transcript on top.
pub struct PromptBuilder {
    catalog: Vec<(String, String)>,
}

impl PromptBuilder {
    pub fn new(catalog: Vec<(String, String)>) -> Self {
        Self { catalog }
    }

    pub fn build_messages(&self, history: &[Turn], query: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt())];

        for turn in history {
            messages.push(match turn.role {
                Role::User => ChatMessage::user(turn.content.clone()),
                Role::Assistant => ChatMessage::assistant(turn.content.clone()),
            });
        }

        messages.push(ChatMessage::user(query.to_string()));
        messages
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "Answer the user's question as well as you can. You have access to the following tools:\n\n",
        );

        for (name, description) in &self.catalog {
            let _ = writeln!(prompt, "{}: {}", name, description);
        }

        let names = self
            .catalog
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        prompt.push_str("\nUse this exact format:\n\n");
        prompt.push_str("Thought: what you are going to do next and why\n");
        let _ = writeln!(prompt, "Action: the tool to use, one of [{}]", names);
        prompt.push_str("Action Input: the input to pass to the tool\n\n");
        prompt.push_str(
            "After each Action, the tool's result is given back to you as an Observation. \
             Repeat Thought/Action/Action Input as many times as you need. \
             Once you know the answer, reply with:\n\n",
        );
        prompt.push_str("Thought: I now know the final answer\n");
        prompt.push_str("Final Answer: the answer to the user's question\n\n");
        prompt.push_str(
            "Never write an Observation yourself, and never combine an Action with a Final Answer in one reply.\n",
        );

        let timestamp = chrono::Local::now().format("%Y-%m-%d (%A)");
        let _ = write!(prompt, "\nCurrent date: {}", timestamp);

        prompt
    }
}
