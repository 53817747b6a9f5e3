//! Citation-style document formatting

use crate::client::ApiClient;
use crate::response::{decode, read_body, transport};
use crate::wire::FormatLinks;
use researchflow_core::{validate, Error, Result};
use std::path::Path;

/// What the formatting service produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Absolute download links for the rendered PDF and its LaTeX source
    Links { pdf: String, tex: String },
    /// The rendered file streamed back directly
    File { filename: String, bytes: Vec<u8> },
}

impl ApiClient {
    pub async fn format_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        style: &str,
    ) -> Result<FormatOutcome> {
        validate::format_file(filename)?;
        let style = validate::format_style(style)?;

        let mime = if filename.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "text/plain"
        };
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(transport)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("style", style)
            .text("filename", filename.to_string());

        tracing::debug!(filename, style, "POST format/");
        let response = self
            .http()
            .post(self.endpoint("format/"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let body = read_body(response).await?;
            let links: FormatLinks = decode(&body)?;
            return match (links.pdf_download_url, links.tex_download_url) {
                (Some(pdf), Some(tex)) => Ok(FormatOutcome::Links {
                    pdf: self.resolve_link(&pdf),
                    tex: self.resolve_link(&tex),
                }),
                _ => Err(Error::Backend(links.message.unwrap_or_else(|| {
                    "the formatter returned no download links".to_string()
                }))),
            };
        }

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response, status).await);
        }
        let served_name = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);
        let bytes = response.bytes().await.map_err(transport)?.to_vec();
        Ok(FormatOutcome::File {
            filename: served_name.unwrap_or_else(|| formatted_name(filename)),
            bytes,
        })
    }

    /// Fetch a link returned by `format_document`
    pub async fn download(&self, link: &str) -> Result<Vec<u8>> {
        let response = self
            .http()
            .get(self.resolve_link(link))
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response, status).await);
        }
        Ok(response.bytes().await.map_err(transport)?.to_vec())
    }
}

async fn rejection(response: reqwest::Response, status: reqwest::StatusCode) -> Error {
    read_body(response).await.err().unwrap_or(Error::Http {
        status: status.as_u16(),
        message: String::new(),
    })
}

fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn formatted_name(uploaded: &str) -> String {
    let stem = Path::new(uploaded)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    format!("{stem}_formatted.pdf")
}
