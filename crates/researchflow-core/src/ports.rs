//! Backend ports the surfaces call through

use crate::error::Result;
use crate::pagination::ContinuationCursor;
use crate::types::{ChatMessage, ResultItem, SearchFilters, SortOrder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters of one search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub sort_by: SortOrder,
    pub year_from: i32,
    pub year_to: i32,
    pub offset: u32,
    pub is_open_access: bool,
}

impl SearchRequest {
    pub fn from_cursor(cursor: &ContinuationCursor, filters: &SearchFilters) -> Self {
        Self {
            query: cursor.query.clone(),
            sort_by: filters.sort_by,
            year_from: filters.year_from,
            year_to: filters.year_to,
            offset: cursor.offset,
            is_open_access: filters.open_access,
        }
    }

    /// The filters this request was built with
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            sort_by: self.sort_by,
            year_from: self.year_from,
            year_to: self.year_to,
            open_access: self.is_open_access,
        }
    }
}

/// One page returned by the search backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub message: String,
    pub articles: Vec<ResultItem>,
}

/// Where the document to chat about comes from
#[derive(Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    File { name: String, bytes: Vec<u8> },
}

impl DocumentSource {
    /// Short label for logs and titles
    pub fn label(&self) -> &str {
        match self {
            DocumentSource::Url(url) => url,
            DocumentSource::File { name, .. } => name,
        }
    }
}

impl std::fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Url(url) => f.debug_tuple("Url").field(url).finish(),
            DocumentSource::File { name, bytes } => f
                .debug_struct("File")
                .field("name", name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}

#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Pull the full text out of a URL or an uploaded file
    async fn extract(&self, source: &DocumentSource) -> Result<ExtractedDocument>;

    /// Answer the last user message given the document text and the dialogue so far
    async fn chat(&self, context: &str, messages: &[ChatMessage]) -> Result<String>;
}
