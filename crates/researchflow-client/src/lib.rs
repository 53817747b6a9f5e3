//! HTTP client for the research backend

mod auth;
mod client;
mod format;
mod response;
mod wire;

pub use client::ApiClient;
pub use format::FormatOutcome;
