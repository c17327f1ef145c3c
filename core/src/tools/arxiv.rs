use crate::error::ToolError;
use crate::tools::{collapse_whitespace, http_client, truncate_result};
use crate::traits::Tool;
use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

const ENDPOINT: &str = "http://export.arxiv.org/api/query";
const NO_RESULTS: &str = "No good Arxiv Result was found";

/// Academic-paper lookup via the arXiv Atom query API. Returns the
/// title and abstract of the single best-matching paper.
pub struct ArxivTool {
    client: reqwest::Client,
}

impl Default for ArxivTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivTool {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "Search arXiv for academic papers. Input a topic or paper title; returns the top paper's title and abstract."
    }

    async fn invoke(&self, query: &str) -> Result<String, ToolError> {
        debug!(query, "arxiv search");

        let search_query = format!("all:{}", query);
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", "1"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("arXiv request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolError::Unavailable(format!(
                "arXiv returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Unavailable(format!("unreadable arXiv response: {}", e)))?;

        Ok(summarize(&body))
    }
}

fn summarize(body: &str) -> String {
    let Some((title, summary)) = top_entry(body) else {
        return NO_RESULTS.to_string();
    };

    match summary {
        Some(summary) => truncate_result(&format!(
            "{}: {}",
            collapse_whitespace(&title),
            collapse_whitespace(&summary)
        )),
        None => truncate_result(&collapse_whitespace(&title)),
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Summary,
}

/// Title and abstract of the feed's first `<entry>`. The feed carries
/// its own `<title>` outside any entry, so capture only starts once an
/// entry is open. Text is unescaped, so entity references (`&amp;`,
/// `&lt;`) reach the observation decoded.
fn top_entry(body: &str) -> Option<(String, Option<String>)> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_entry = false;
    let mut capture: Option<Field> = None;
    let mut title = String::new();
    let mut summary = String::new();

    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(tag) => match tag.local_name().as_ref() {
                b"entry" => in_entry = true,
                b"title" if in_entry => capture = Some(Field::Title),
                b"summary" if in_entry => capture = Some(Field::Summary),
                _ => {}
            },
            Event::Text(text) => {
                if in_entry && let Some(field) = capture {
                    let decoded = text.unescape().ok()?;
                    let target = match field {
                        Field::Title => &mut title,
                        Field::Summary => &mut summary,
                    };
                    if !target.is_empty() {
                        target.push(' ');
                    }
                    target.push_str(&decoded);
                }
            }
            Event::End(tag) => match tag.local_name().as_ref() {
                b"entry" => break,
                b"title" | b"summary" => capture = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    let summary = summary.trim();
    Some((
        title.to_string(),
        (!summary.is_empty()).then(|| summary.to_string()),
    ))
}
