//! Ordered, append-only turn history of one surface

use crate::types::{ResultItem, ResultSet, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Add a turn to the end and return the new length
    pub fn append(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len()
    }

    /// Extend the trailing `ResultSet` with another page.
    ///
    /// Fails closed: when the last turn is not a `ResultSet` the transcript is
    /// left untouched and `false` is returned.
    pub fn merge_into_last_result_set(
        &mut self,
        new_items: Vec<ResultItem>,
        new_summary_message: String,
        offset: u32,
    ) -> bool {
        match self.turns.last_mut() {
            Some(Turn::ResultSet(rs)) => {
                rs.items.extend(new_items);
                rs.summary_message = new_summary_message;
                rs.last_offset = offset;
                true
            }
            _ => {
                tracing::warn!(
                    turns = self.turns.len(),
                    "merge skipped: last turn is not a result set"
                );
                false
            }
        }
    }

    /// Replace the most recent `ResultSet` in place, or append when none exists.
    ///
    /// Returns `true` when an existing turn was replaced.
    pub fn replace_last_result_set(&mut self, result_set: ResultSet) -> bool {
        let position = self
            .turns
            .iter()
            .rposition(|t| matches!(t, Turn::ResultSet(_)));
        match position {
            Some(idx) => {
                self.turns[idx] = Turn::ResultSet(result_set);
                true
            }
            None => {
                self.turns.push(Turn::ResultSet(result_set));
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn last_result_set(&self) -> Option<&ResultSet> {
        self.turns.iter().rev().find_map(Turn::as_result_set)
    }

    pub fn last_user_query(&self) -> Option<&str> {
        self.turns.iter().rev().find_map(|t| match t {
            Turn::UserQuery { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// No response turn appears before the first user query
    pub fn is_well_formed(&self) -> bool {
        let first_query = self
            .turns
            .iter()
            .position(|t| matches!(t, Turn::UserQuery { .. }));
        let first_response = self.turns.iter().position(Turn::is_response);
        match (first_query, first_response) {
            (_, None) => true,
            (Some(q), Some(r)) => q < r,
            (None, Some(_)) => false,
        }
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
