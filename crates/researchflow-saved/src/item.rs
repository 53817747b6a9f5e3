use chrono::{DateTime, Utc};
use researchflow_core::ResultItem;
use serde::{Deserialize, Serialize};

/// A result item the user bookmarked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    #[serde(flatten)]
    pub item: ResultItem,
    /// Entries written before timestamps were kept read as saved now
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

impl SavedItem {
    pub fn new(item: ResultItem) -> Self {
        Self {
            item,
            saved_at: Utc::now(),
        }
    }

    pub fn url(&self) -> &str {
        &self.item.url
    }
}
