//! Offset-based continuation of the active query

/// Results requested per backend call
pub const PAGE_SIZE: u32 = 25;

/// Enough state to ask the backend for the next page of the active query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationCursor {
    pub query: String,
    pub offset: u32,
}

/// Owns the cursor of one explore surface.
///
/// `next_page` advances optimistically when a call is issued; the caller
/// rolls back with `rollback` if that call fails so a retry asks for the
/// same page again.
#[derive(Debug, Clone)]
pub struct PaginationController {
    page_size: u32,
    cursor: Option<ContinuationCursor>,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            cursor: None,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn cursor(&self) -> Option<&ContinuationCursor> {
        self.cursor.as_ref()
    }

    pub fn query(&self) -> Option<&str> {
        self.cursor.as_ref().map(|c| c.query.as_str())
    }

    /// A fresh query always starts at offset 0
    pub fn start(&mut self, query: impl Into<String>) -> &ContinuationCursor {
        self.cursor.insert(ContinuationCursor {
            query: query.into(),
            offset: 0,
        })
    }

    /// Restore a cursor recovered from a persisted session
    pub fn resume(&mut self, query: impl Into<String>, offset: u32) {
        self.cursor = Some(ContinuationCursor {
            query: query.into(),
            offset,
        });
    }

    /// Advance by one page and return the cursor to request.
    ///
    /// `None` when there is no active query.
    pub fn next_page(&mut self) -> Option<ContinuationCursor> {
        let page_size = self.page_size;
        self.cursor.as_mut().map(|cursor| {
            cursor.offset = cursor.offset.saturating_add(page_size);
            cursor.clone()
        })
    }

    /// Undo the last `next_page`
    pub fn rollback(&mut self) {
        let page_size = self.page_size;
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.offset = cursor.offset.saturating_sub(page_size);
        }
    }

    /// A filter change restarts the current query from the first page
    pub fn refine(&mut self) -> Option<ContinuationCursor> {
        self.cursor.as_mut().map(|cursor| {
            cursor.offset = 0;
            cursor.clone()
        })
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}
