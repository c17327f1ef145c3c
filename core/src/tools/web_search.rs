use crate::error::ToolError;
use crate::tools::{http_client, truncate_result};
use crate::traits::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const ENDPOINT: &str = "https://api.duckduckgo.com/";
const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Related topics mix plain entries with nested topic groups.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "Topics", default)]
    topics: Vec<RelatedTopic>,
}

/// General web lookup via the DuckDuckGo Instant Answer API.
pub struct WebSearchTool {
    client: reqwest::Client,
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearchTool {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Useful for current events and general knowledge questions."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        debug!(query, "web search");

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("DuckDuckGo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolError::Unavailable(format!(
                "DuckDuckGo returned status {}",
                response.status()
            )));
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| ToolError::Unavailable(format!("malformed DuckDuckGo response: {}", e)))?;

        Ok(summarize(&answer))
    }
}

fn summarize(answer: &InstantAnswer) -> String {
    if !answer.abstract_text.trim().is_empty() {
        return truncate_result(answer.abstract_text.trim());
    }

    match first_topic_text(&answer.related_topics) {
        Some(text) => truncate_result(text),
        None => NO_RESULTS.to_string(),
    }
}

fn first_topic_text(topics: &[RelatedTopic]) -> Option<&str> {
    for topic in topics {
        let text = topic.text.trim();
        if !text.is_empty() {
            return Some(text);
        }
        if let Some(nested) = first_topic_text(&topic.topics) {
            return Some(nested);
        }
    }
    None
}
