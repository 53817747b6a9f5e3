//! Request and response bodies of the backend API

use researchflow_core::{ChatMessage, ResultItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

fn succeeded() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub articles: Vec<ResultItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExtractUrlRequest<'a> {
    pub input_value: &'a str,
    pub is_url: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub context: &'a str,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FormatLinks {
    #[serde(default)]
    pub pdf_download_url: Option<String>,
    #[serde(default)]
    pub tex_download_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
