use crate::response::{read_json, transport};
use crate::wire::{ChatRequest, ChatResponse, ExtractResponse, ExtractUrlRequest, SearchResponse};
use async_trait::async_trait;
use researchflow_core::{
    ChatMessage, DocumentBackend, DocumentSource, Error, ExtractedDocument, Result, SearchBackend,
    SearchPage, SearchRequest,
};
use researchflow_storage::{keys, KeyValueStore};
use std::sync::Arc;

/// Client for every backend endpoint.
///
/// The auth token lives in the key-value store rather than in the client so
/// that every process sharing the store sees the same session.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    pub(crate) store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|err| Error::validation(format!("invalid API base URL `{base_url}`: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "API base URL `{base_url}` must use http or https"
            )));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            http: reqwest::Client::new(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Resolve a link the backend returned relative to the API base
    pub fn resolve_link(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with('/') {
            format!("{}{}", self.base_url, link)
        } else {
            format!("{}/{}", self.base_url, link)
        }
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.store.get(keys::AUTH_TOKEN)?)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        tracing::debug!(query = %request.query, offset = request.offset, "POST search/");
        let response = self
            .http
            .post(self.endpoint("search/"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let body: SearchResponse = read_json(response).await?;
        if !body.success {
            let message = if body.message.is_empty() {
                "the search could not be completed".to_string()
            } else {
                body.message
            };
            return Err(Error::Backend(message));
        }
        Ok(SearchPage {
            message: body.message,
            articles: body.articles,
        })
    }
}

#[async_trait]
impl DocumentBackend for ApiClient {
    async fn extract(&self, source: &DocumentSource) -> Result<ExtractedDocument> {
        let request = match source {
            DocumentSource::Url(url) => {
                tracing::debug!(%url, "POST extract/json/");
                self.http
                    .post(self.endpoint("extract/json/"))
                    .json(&ExtractUrlRequest {
                        input_value: url.trim(),
                        is_url: true,
                    })
            }
            DocumentSource::File { name, bytes } => {
                tracing::debug!(%name, size = bytes.len(), "POST extract/file/");
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(name.clone())
                    .mime_str("application/pdf")
                    .map_err(transport)?;
                self.http
                    .post(self.endpoint("extract/file/"))
                    .multipart(reqwest::multipart::Form::new().part("file", part))
            }
        };
        let response = request.send().await.map_err(transport)?;
        let body: ExtractResponse = read_json(response).await?;
        Ok(ExtractedDocument {
            text: body.text,
            title: body.title,
        })
    }

    async fn chat(&self, context: &str, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!(messages = messages.len(), "POST chat/");
        let response = self
            .http
            .post(self.endpoint("chat/"))
            .json(&ChatRequest { context, messages })
            .send()
            .await
            .map_err(transport)?;
        let body: ChatResponse = read_json(response).await?;
        Ok(body.response)
    }
}
