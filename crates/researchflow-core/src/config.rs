//! Client configuration

use crate::types::SearchFilters;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Backend used when neither the config file nor the environment names one
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Overrides `api_base_url` when set and non-empty
pub const API_URL_ENV: &str = "RESEARCHFLOW_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Base URL every endpoint path is joined onto
    pub api_base_url: String,

    /// Filters a fresh explore surface starts with
    pub default_filters: SearchFilters,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            default_filters: SearchFilters::new(),
        }
    }

    /// Read `path` when it exists, then apply the environment override.
    ///
    /// A missing file yields the defaults. A malformed one is logged and
    /// ignored.
    pub fn load(path: &Path) -> Self {
        let mut config = match researchflow_storage::read_json::<Config>(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Self::new()
            }
        };
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.api_base_url = url.to_string();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
