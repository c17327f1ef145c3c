pub mod arxiv;
pub mod web_search;
pub mod wikipedia;

pub use arxiv::ArxivTool;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

/// Character budget every adapter applies to its result before handing
/// it to the loop.
pub const RESULT_MAX_CHARS: usize = 200;

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

/// Collapse runs of whitespace (Atom abstracts and wiki extracts carry
/// hard line breaks) into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn truncate_result(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= RESULT_MAX_CHARS {
        return text.to_string();
    }

    let truncated: String = chars[..RESULT_MAX_CHARS].iter().collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        assert_eq!(truncate_result("short"), "short");
    }

    #[test]
    fn exact_budget_is_untouched() {
        let text = "x".repeat(RESULT_MAX_CHARS);
        assert_eq!(truncate_result(&text), text);
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "y".repeat(RESULT_MAX_CHARS + 50);
        let result = truncate_result(&text);
        assert_eq!(result.chars().count(), RESULT_MAX_CHARS + 3);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(
            collapse_whitespace("a  b\n  c\t\td"),
            "a b c d"
        );
    }
}
