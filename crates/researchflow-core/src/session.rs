//! Durable snapshots of a surface's conversation

use crate::error::Result;
use crate::transcript::Transcript;
use crate::types::SearchFilters;
use researchflow_storage::{keys, load_json, save_json, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Independently-stateful conversational screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Explore,
    DocumentChat,
}

impl Surface {
    /// Each surface persists under its own key so histories never mix
    pub fn storage_key(self) -> &'static str {
        match self {
            Surface::Explore => keys::EXPLORE_HISTORY,
            Surface::DocumentChat => keys::DOCUMENT_HISTORY,
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Explore => f.write_str("explore"),
            Surface::DocumentChat => f.write_str("document-chat"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub transcript: Transcript,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_title: Option<String>,
    /// Filters the explore surface was last searching with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

impl SessionState {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            context_text: None,
            context_title: None,
            filters: None,
        }
    }
}

/// Binds one key-value store to one surface's session key
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    surface: Surface,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, surface: Surface) -> Self {
        Self { store, surface }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Restore the last committed snapshot.
    ///
    /// Missing, unreadable and malformed sessions come back as `None`, as
    /// does one holding no turns, no document context and no filters. The
    /// surface then starts fresh.
    pub fn load(&self) -> Option<SessionState> {
        let key = self.surface.storage_key();
        match load_json::<SessionState>(self.store.as_ref(), key) {
            Ok(Some(state))
                if state.transcript.is_empty()
                    && state.context_text.is_none()
                    && state.filters.is_none() =>
            {
                None
            }
            Ok(Some(state)) if !state.transcript.is_well_formed() => {
                tracing::warn!(surface = %self.surface, "discarding session with a response before any query");
                None
            }
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(surface = %self.surface, error = %err, "ignoring unreadable session");
                None
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        save_json(self.store.as_ref(), self.surface.storage_key(), state)?;
        tracing::debug!(surface = %self.surface, turns = state.transcript.len(), "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(self.surface.storage_key())?;
        tracing::debug!(surface = %self.surface, "session cleared");
        Ok(())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}
