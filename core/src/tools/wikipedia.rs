use crate::error::ToolError;
use crate::tools::{collapse_whitespace, http_client, truncate_result};
use crate::traits::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

#[derive(Debug, Deserialize)]
struct WikiResponse {
    #[serde(default)]
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    /// Keyed by page id; the generator limit keeps it to one entry.
    #[serde(default)]
    pages: HashMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
}

/// Encyclopedia lookup via the MediaWiki action API: search for the
/// query, take the top article, return its plain-text intro.
pub struct WikipediaTool {
    client: reqwest::Client,
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WikipediaTool {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up a topic on Wikipedia and return a short summary of the top matching article."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        debug!(query, "wikipedia search");

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("Wikipedia request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolError::Unavailable(format!(
                "Wikipedia returned status {}",
                response.status()
            )));
        }

        let body: WikiResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Unavailable(format!("malformed Wikipedia response: {}", e)))?;

        Ok(summarize(&body))
    }
}

fn summarize(body: &WikiResponse) -> String {
    let Some(query) = &body.query else {
        return NO_RESULTS.to_string();
    };

    let Some(page) = query.pages.values().find(|p| !p.extract.trim().is_empty()) else {
        return NO_RESULTS.to_string();
    };

    let combined = format!("{}: {}", page.title, collapse_whitespace(&page.extract));
    truncate_result(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_the_top_page() {
        let body: WikiResponse = serde_json::from_value(serde_json::json!({
            "query": {
                "pages": {
                    "9475": {
                        "title": "Ada Lovelace",
                        "extract": "Ada Lovelace was an English mathematician\nand writer."
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(
            summarize(&body),
            "Ada Lovelace: Ada Lovelace was an English mathematician and writer."
        );
    }

    #[test]
    fn no_query_section_reports_no_results() {
        let body: WikiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(summarize(&body), NO_RESULTS);
    }

    #[test]
    fn empty_extract_reports_no_results() {
        let body: WikiResponse = serde_json::from_value(serde_json::json!({
            "query": {"pages": {"1": {"title": "Stub", "extract": ""}}}
        }))
        .unwrap();

        assert_eq!(summarize(&body), NO_RESULTS);
    }
}
