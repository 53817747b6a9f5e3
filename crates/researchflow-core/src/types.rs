//! Core types for conversational sessions

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One retrieved article. `url` is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub citation_count: u64,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
}

impl ResultItem {
    pub fn same_entity(&self, other: &ResultItem) -> bool {
        self.url == other.url
    }

    /// Authors joined for display
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        }
    }
}

/// A page (or several merged pages) of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub summary_message: String,
    pub items: Vec<ResultItem>,
    pub page_size: u32,
    pub last_offset: u32,
}

impl ResultSet {
    pub fn new(summary_message: String, items: Vec<ResultItem>, page_size: u32) -> Self {
        Self {
            summary_message,
            items,
            page_size,
            last_offset: 0,
        }
    }

    /// Whether another page may exist.
    ///
    /// Approximation: the backend exposes no total count, so a full last page
    /// is read as "maybe more" and a short one as "done".
    pub fn has_more(&self) -> bool {
        self.page_size > 0 && self.items.len() == (self.last_offset + self.page_size) as usize
    }
}

/// One atomic entry in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    UserQuery { text: String },
    ResultSet(ResultSet),
    AssistantMessage { text: String },
    ErrorNotice { text: String },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::UserQuery { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Turn::AssistantMessage { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Turn::ErrorNotice { text: text.into() }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Turn::ResultSet(_) | Turn::AssistantMessage { .. })
    }

    pub fn as_result_set(&self) -> Option<&ResultSet> {
        match self {
            Turn::ResultSet(rs) => Some(rs),
            _ => None,
        }
    }
}

/// Search ordering understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Backend's own ranking
    #[default]
    Default,
    /// Most cited first
    Relevance,
    /// Newest first
    Recency,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Default => "default",
            SortOrder::Relevance => "relevance",
            SortOrder::Recency => "recency",
        };
        f.write_str(name)
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(SortOrder::Default),
            "relevance" => Ok(SortOrder::Relevance),
            "recency" => Ok(SortOrder::Recency),
            other => Err(format!(
                "unknown sort order `{other}` (expected default, relevance or recency)"
            )),
        }
    }
}

/// Filter parameters carried by every search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub sort_by: SortOrder,
    pub year_from: i32,
    pub year_to: i32,
    pub open_access: bool,
}

impl SearchFilters {
    pub const EARLIEST_YEAR: i32 = 1990;

    pub fn new() -> Self {
        Self {
            sort_by: SortOrder::Default,
            year_from: Self::EARLIEST_YEAR,
            year_to: chrono::Utc::now().year(),
            open_access: true,
        }
    }
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self::new()
    }
}

/// Speaker of a document-chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Wire form of one document-chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> ResultItem {
        ResultItem {
            url: url.to_string(),
            title: "Attention Is All You Need".to_string(),
            authors: vec!["Vaswani".to_string(), "Shazeer".to_string()],
            year: Some(2017),
            citation_count: 100_000,
            abstract_text: Some("The dominant sequence transduction models...".to_string()),
            journal: None,
        }
    }

    #[test]
    fn test_result_item_wire_names() {
        let json = serde_json::to_value(item("https://a")).unwrap();
        assert_eq!(json["citationCount"], 100_000);
        assert!(json.get("abstract").is_some());
        assert!(json.get("journal").is_none());
    }

    #[test]
    fn test_result_item_tolerates_missing_fields() {
        let parsed: ResultItem =
            serde_json::from_str(r#"{"url":"https://x","title":"T","year":null}"#).unwrap();
        assert_eq!(parsed.year, None);
        assert!(parsed.authors.is_empty());
        assert_eq!(parsed.citation_count, 0);
        assert_eq!(parsed.author_line(), "Unknown");
    }

    #[test]
    fn test_identity_is_url() {
        let a = item("https://same");
        let mut b = item("https://same");
        b.title = "Different title".to_string();
        assert!(a.same_entity(&b));
        assert!(!a.same_entity(&item("https://other")));
    }

    #[test]
    fn test_has_more_heuristic() {
        let full: Vec<_> = (0..25).map(|i| item(&format!("https://{i}"))).collect();
        let mut rs = ResultSet::new("found".to_string(), full, 25);
        assert!(rs.has_more());

        rs.items.truncate(10);
        assert!(!rs.has_more());

        let fifty: Vec<_> = (0..50).map(|i| item(&format!("https://{i}"))).collect();
        let merged = ResultSet {
            summary_message: "more".to_string(),
            items: fifty,
            page_size: 25,
            last_offset: 25,
        };
        assert!(merged.has_more());
    }

    #[test]
    fn test_turn_tagging() {
        let json = serde_json::to_string(&Turn::user("transformers")).unwrap();
        assert!(json.contains(r#""kind":"user_query""#));

        let rs = Turn::ResultSet(ResultSet::new("m".to_string(), vec![], 25));
        let back: Turn = serde_json::from_str(&serde_json::to_string(&rs).unwrap()).unwrap();
        assert_eq!(back, rs);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("Recency".parse::<SortOrder>(), Ok(SortOrder::Recency));
        assert_eq!(SortOrder::Relevance.to_string(), "relevance");
        assert!("popular".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_filter_defaults() {
        let filters = SearchFilters::default();
        assert_eq!(filters.sort_by, SortOrder::Default);
        assert_eq!(filters.year_from, 1990);
        assert!(filters.year_to >= 2024);
        assert!(filters.open_access);
    }
}
