//! Grammar for the model's ReAct-formatted replies.
//!
//! A reply is either a tool call (`Action:` + `Action Input:` lines), a
//! `Final Answer:`, or neither. Parsing never fails with an error: a
//! reply the grammar cannot place is returned as `Unparsable` and the
//! loop decides what to do with it.

const ACTION_MARKER: &str = "Action:";
const ACTION_INPUT_MARKER: &str = "Action Input:";
const FINAL_ANSWER_MARKER: &str = "Final Answer:";
const THOUGHT_MARKER: &str = "Thought:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    ToolCall { name: String, input: String },
    FinalAnswer(String),
    Unparsable(String),
}

pub fn parse(text: &str) -> Directive {
    let action = field_line(text, ACTION_MARKER);
    let has_final = text.contains(FINAL_ANSWER_MARKER);

    match (action, has_final) {
        // A reply claiming both a tool call and a final answer is
        // ambiguous; treat it like any other malformed reply.
        (Some(_), true) => Directive::Unparsable(text.to_string()),
        (Some(name), false) => {
            let input = field_line(text, ACTION_INPUT_MARKER).unwrap_or_default();
            Directive::ToolCall { name, input }
        }
        (None, true) => {
            let idx = text.find(FINAL_ANSWER_MARKER).unwrap_or(0);
            let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim();
            Directive::FinalAnswer(answer.to_string())
        }
        (None, false) => Directive::Unparsable(text.to_string()),
    }
}

/// The reasoning text preceding the action or final answer, with the
/// `Thought:` prefix stripped.
pub fn thought(text: &str) -> Option<String> {
    let end = [ACTION_MARKER, FINAL_ANSWER_MARKER]
        .iter()
        .filter_map(|marker| text.find(marker))
        .min()
        .unwrap_or(text.len());

    let head = text[..end].trim();
    let head = head.strip_prefix(THOUGHT_MARKER).unwrap_or(head).trim();

    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

/// Rest of the line following `marker`, trimmed of whitespace and any
/// decorative backticks or quotes the model wrapped the value in.
fn field_line(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let line = text[start..].lines().next().unwrap_or("");
    let value = line.trim().trim_matches(['`', '"', '\'']).trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call() {
        let reply = "Thought: I should search for this.\nAction: web_search\nAction Input: rust language";
        assert_eq!(
            parse(reply),
            Directive::ToolCall {
                name: "web_search".to_string(),
                input: "rust language".to_string(),
            }
        );
        assert_eq!(
            thought(reply).as_deref(),
            Some("I should search for this.")
        );
    }

    #[test]
    fn final_answer() {
        let reply = "Thought: I now know the final answer\nFinal Answer: Rust is a systems language.";
        assert_eq!(
            parse(reply),
            Directive::FinalAnswer("Rust is a systems language.".to_string())
        );
    }

    #[test]
    fn final_answer_spans_lines() {
        let reply = "Final Answer: line one\nline two";
        assert_eq!(
            parse(reply),
            Directive::FinalAnswer("line one\nline two".to_string())
        );
    }

    #[test]
    fn quoted_action_name() {
        let reply = "Action: `wikipedia`\nAction Input: \"Ada Lovelace\"";
        assert_eq!(
            parse(reply),
            Directive::ToolCall {
                name: "wikipedia".to_string(),
                input: "Ada Lovelace".to_string(),
            }
        );
    }

    #[test]
    fn action_without_input() {
        let reply = "Action: arxiv";
        assert_eq!(
            parse(reply),
            Directive::ToolCall {
                name: "arxiv".to_string(),
                input: String::new(),
            }
        );
    }

    #[test]
    fn both_action_and_final_answer_is_unparsable() {
        let reply = "Action: web_search\nAction Input: x\nFinal Answer: y";
        assert!(matches!(parse(reply), Directive::Unparsable(_)));
    }

    #[test]
    fn free_text_is_unparsable() {
        let reply = "I think the answer is probably 42 but let me check.";
        assert!(matches!(parse(reply), Directive::Unparsable(_)));
    }

    #[test]
    fn thought_absent() {
        assert_eq!(thought("Final Answer: done"), None);
    }
}
