#![allow(dead_code)]

use async_trait::async_trait;
use researchflow_core::{
    ChatMessage, DocumentBackend, DocumentSource, Error, ExtractedDocument, Result, ResultItem,
    SearchBackend, SearchPage, SearchRequest,
};
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn article(n: usize) -> ResultItem {
    ResultItem {
        url: format!("https://papers.test/{n}"),
        title: format!("Paper {n}"),
        authors: vec!["Hopper".to_string()],
        year: Some(2020),
        citation_count: n as u64,
        abstract_text: None,
        journal: None,
    }
}

pub fn page(range: std::ops::Range<usize>) -> SearchPage {
    SearchPage {
        message: format!("Found {} papers", range.len()),
        articles: range.map(article).collect(),
    }
}

/// Backend that replays queued answers in order and records every call
#[derive(Default)]
pub struct ScriptedBackend {
    pages: Mutex<VecDeque<Result<SearchPage>>>,
    extractions: Mutex<VecDeque<Result<ExtractedDocument>>>,
    replies: Mutex<VecDeque<Result<String>>>,
    pub searches: Mutex<Vec<SearchRequest>>,
    pub chats: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: Result<SearchPage>) -> &Self {
        self.pages.lock().unwrap().push_back(page);
        self
    }

    pub fn push_extraction(&self, doc: Result<ExtractedDocument>) -> &Self {
        self.extractions.lock().unwrap().push_back(doc);
        self
    }

    pub fn push_reply(&self, reply: Result<String>) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn offsets(&self) -> Vec<u32> {
        self.searches.lock().unwrap().iter().map(|r| r.offset).collect()
    }
}

fn unscripted(what: &str) -> Error {
    Error::Transport(format!("no scripted {what}"))
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.searches.lock().unwrap().push(request.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("page")))
    }
}

#[async_trait]
impl DocumentBackend for ScriptedBackend {
    async fn extract(&self, _source: &DocumentSource) -> Result<ExtractedDocument> {
        self.extractions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("extraction")))
    }

    async fn chat(&self, _context: &str, messages: &[ChatMessage]) -> Result<String> {
        self.chats.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("reply")))
    }
}
