//! Search-exploration surface
//!
//! Every backend call goes through a two-phase `begin_*` / `complete_*`
//! pair so the surface never holds a borrow across the network call. The
//! async helpers (`search`, `more`, `refine`) run both phases against a
//! [`SearchBackend`].

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pagination::{ContinuationCursor, PaginationController, PAGE_SIZE};
use crate::ports::{SearchBackend, SearchPage, SearchRequest};
use crate::sequencer::{Completion, RequestKind, RequestSequencer, SurfaceStatus, Ticket};
use crate::session::{SessionState, SessionStore, Surface};
use crate::transcript::Transcript;
use crate::types::{ResultSet, SearchFilters, Turn};
use crate::validate;
use researchflow_storage::KeyValueStore;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Empty transcript, nothing asked yet
    Start,
    Conversation,
}

/// An admitted search call waiting for its backend result
#[derive(Debug)]
pub struct PendingSearch {
    ticket: Ticket,
    pub request: SearchRequest,
}

impl PendingSearch {
    pub fn kind(&self) -> RequestKind {
        self.ticket.kind()
    }
}

#[derive(Debug)]
pub struct ExploreSurface {
    transcript: Transcript,
    pages: PaginationController,
    filters: SearchFilters,
    sequencer: RequestSequencer,
    session: SessionStore,
}

impl ExploreSurface {
    /// Build the surface and restore its last session, if any
    pub fn mount(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        let session = SessionStore::new(store, Surface::Explore);
        let mut surface = Self {
            transcript: Transcript::new(),
            pages: PaginationController::new(PAGE_SIZE),
            filters: config.default_filters.clone(),
            sequencer: RequestSequencer::new(),
            session,
        };

        if let Some(state) = surface.session.load() {
            surface.transcript = state.transcript;
            if let Some(filters) = state.filters {
                surface.filters = filters;
            }
            if let Some(query) = surface.transcript.last_user_query() {
                let offset = surface
                    .transcript
                    .last_result_set()
                    .map(|rs| rs.last_offset)
                    .unwrap_or(0);
                surface.pages.resume(query.to_string(), offset);
            }
            tracing::info!(turns = surface.transcript.len(), "explore session restored");
        }
        surface
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.transcript.is_empty() {
            DisplayMode::Start
        } else {
            DisplayMode::Conversation
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn cursor(&self) -> Option<&ContinuationCursor> {
        self.pages.cursor()
    }

    pub fn status(&self) -> SurfaceStatus {
        self.sequencer.status()
    }

    pub fn is_loading(&self) -> bool {
        self.sequencer.is_loading()
    }

    /// Whether "load more" would issue a call right now
    pub fn can_load_more(&self) -> bool {
        self.pages.query().is_some()
            && matches!(self.transcript.last(), Some(Turn::ResultSet(rs)) if rs.has_more())
    }

    /// Admit a new query and append it to the transcript
    pub fn begin_search(&mut self, query: &str) -> Result<PendingSearch> {
        let query = validate::non_empty(query, "search query")?;
        let ticket = self.sequencer.begin(RequestKind::Search)?;
        let cursor = self.pages.start(query).clone();
        self.transcript.append(Turn::user(query));
        tracing::debug!(query, "search issued");
        Ok(PendingSearch {
            ticket,
            request: SearchRequest::from_cursor(&cursor, &self.filters),
        })
    }

    pub fn complete_search(
        &mut self,
        pending: PendingSearch,
        result: Result<SearchPage>,
    ) -> Completion {
        if !self.sequencer.finish(pending.ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(page) => {
                let count = page.articles.len();
                self.transcript.append(Turn::ResultSet(ResultSet::new(
                    page.message,
                    page.articles,
                    self.pages.page_size(),
                )));
                tracing::info!(count, "search results committed");
                self.persist();
                Completion::Committed
            }
            Err(err) => {
                tracing::debug!(error = %err, "search failed");
                self.transcript.append(Turn::error(err.user_message()));
                self.persist();
                Completion::Failed(err)
            }
        }
    }

    /// Admit the next page of the active query.
    ///
    /// `Ok(None)` when there is nothing to continue: no query yet, the
    /// last page came back short, or the latest turn is not a result set.
    pub fn begin_load_more(&mut self) -> Result<Option<PendingSearch>> {
        if !self.can_load_more() {
            tracing::debug!("load more skipped");
            return Ok(None);
        }
        let ticket = self.sequencer.begin(RequestKind::LoadMore)?;
        let Some(cursor) = self.pages.next_page() else {
            self.sequencer.finish(ticket);
            return Ok(None);
        };
        tracing::debug!(query = %cursor.query, offset = cursor.offset, "load more issued");
        Ok(Some(PendingSearch {
            ticket,
            request: SearchRequest::from_cursor(&cursor, &self.filters),
        }))
    }

    /// Merge the next page, or roll the cursor back on failure.
    ///
    /// A failed page leaves the transcript untouched; the error comes back
    /// as `Completion::Failed` for the caller to show as a notification.
    pub fn complete_load_more(
        &mut self,
        pending: PendingSearch,
        result: Result<SearchPage>,
    ) -> Completion {
        if !self.sequencer.finish(pending.ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(page) => {
                let count = page.articles.len();
                let offset = pending.request.offset;
                if !self
                    .transcript
                    .merge_into_last_result_set(page.articles, page.message, offset)
                {
                    self.pages.rollback();
                    return Completion::Stale;
                }
                tracing::info!(count, offset, "page merged");
                self.persist();
                Completion::Committed
            }
            Err(err) => {
                self.pages.rollback();
                tracing::debug!(error = %err, "load more failed");
                Completion::Failed(err)
            }
        }
    }

    /// Store new filters, or, when a query is active, admit a re-run of it
    /// from the first page.
    ///
    /// With an active query the filters become current only once the
    /// refined page commits, so later pages always match the results shown.
    pub fn begin_refine(&mut self, filters: SearchFilters) -> Result<Option<PendingSearch>> {
        validate::year_range(filters.year_from, filters.year_to)?;
        if self.sequencer.is_loading() {
            return Err(Error::Busy);
        }
        if self.pages.query().is_none() {
            self.filters = filters;
            self.persist();
            tracing::debug!("filters stored without an active query");
            return Ok(None);
        }
        let ticket = self.sequencer.begin(RequestKind::Refine)?;
        let Some(cursor) = self.pages.refine() else {
            self.sequencer.finish(ticket);
            return Ok(None);
        };
        tracing::debug!(query = %cursor.query, "refine issued");
        Ok(Some(PendingSearch {
            ticket,
            request: SearchRequest::from_cursor(&cursor, &filters),
        }))
    }

    /// Replace the latest result set with the refined first page
    pub fn complete_refine(
        &mut self,
        pending: PendingSearch,
        result: Result<SearchPage>,
    ) -> Completion {
        if !self.sequencer.finish(pending.ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(page) => {
                let replaced = self.transcript.replace_last_result_set(ResultSet::new(
                    page.message,
                    page.articles,
                    self.pages.page_size(),
                ));
                self.filters = pending.request.filters();
                tracing::info!(replaced, "refined results committed");
                self.persist();
                Completion::Committed
            }
            Err(err) => {
                let previous = self
                    .transcript
                    .last_result_set()
                    .map(|rs| rs.last_offset)
                    .unwrap_or(0);
                if let Some(query) = self.pages.query().map(str::to_string) {
                    self.pages.resume(query, previous);
                }
                tracing::debug!(error = %err, "refine failed");
                Completion::Failed(err)
            }
        }
    }

    pub async fn search<B>(&mut self, backend: &B, query: &str) -> Result<Completion>
    where
        B: SearchBackend + ?Sized,
    {
        let pending = self.begin_search(query)?;
        let result = backend.search(&pending.request).await;
        Ok(self.complete_search(pending, result))
    }

    /// `Ok(None)` when there was nothing to load
    pub async fn more<B>(&mut self, backend: &B) -> Result<Option<Completion>>
    where
        B: SearchBackend + ?Sized,
    {
        let Some(pending) = self.begin_load_more()? else {
            return Ok(None);
        };
        let result = backend.search(&pending.request).await;
        Ok(Some(self.complete_load_more(pending, result)))
    }

    /// `Ok(None)` when the filters were only stored
    pub async fn refine<B>(
        &mut self,
        backend: &B,
        filters: SearchFilters,
    ) -> Result<Option<Completion>>
    where
        B: SearchBackend + ?Sized,
    {
        let Some(pending) = self.begin_refine(filters)? else {
            return Ok(None);
        };
        let result = backend.search(&pending.request).await;
        Ok(Some(self.complete_refine(pending, result)))
    }

    /// Forget the conversation and its stored session
    pub fn new_conversation(&mut self) -> Result<()> {
        self.sequencer.invalidate();
        self.transcript.reset();
        self.pages.reset();
        self.session.clear()?;
        tracing::info!("explore conversation reset");
        Ok(())
    }

    /// Orphan any outstanding request so its completion is dropped
    pub fn teardown(&mut self) {
        self.sequencer.invalidate();
    }

    fn persist(&self) {
        let state = SessionState {
            filters: Some(self.filters.clone()),
            ..SessionState::new(self.transcript.clone())
        };
        if let Err(err) = self.session.save(&state) {
            tracing::warn!(error = %err, "failed to persist explore session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultItem;
    use researchflow_storage::MemoryStore;

    fn items(prefix: &str, n: usize) -> Vec<ResultItem> {
        (0..n)
            .map(|i| ResultItem {
                url: format!("https://{prefix}/{i}"),
                title: format!("{prefix} {i}"),
                authors: vec!["A. Author".to_string()],
                year: Some(2021),
                citation_count: i as u64,
                abstract_text: None,
                journal: None,
            })
            .collect()
    }

    fn page(prefix: &str, n: usize) -> Result<SearchPage> {
        Ok(SearchPage {
            message: format!("{n} results for {prefix}"),
            articles: items(prefix, n),
        })
    }

    fn mounted() -> (Arc<MemoryStore>, ExploreSurface) {
        let store = Arc::new(MemoryStore::new());
        let surface = ExploreSurface::mount(store.clone(), &Config::new());
        (store, surface)
    }

    #[test]
    fn test_empty_query_issues_nothing() {
        let (_, mut surface) = mounted();
        assert!(matches!(surface.begin_search("   "), Err(Error::Validation(_))));
        assert!(surface.transcript().is_empty());
        assert!(!surface.is_loading());
    }

    #[test]
    fn test_search_success() {
        let (_, mut surface) = mounted();
        let pending = surface.begin_search(" transformers ").unwrap();
        assert_eq!(pending.request.query, "transformers");
        assert_eq!(pending.request.offset, 0);
        assert!(surface.is_loading());
        assert_eq!(surface.transcript().len(), 1);

        assert!(surface.complete_search(pending, page("t", 25)).is_committed());
        assert!(!surface.is_loading());
        assert_eq!(surface.display_mode(), DisplayMode::Conversation);
        assert!(surface.can_load_more());
    }

    #[test]
    fn test_second_submit_while_pending_is_busy() {
        let (_, mut surface) = mounted();
        let _pending = surface.begin_search("a").unwrap();
        assert!(matches!(surface.begin_search("b"), Err(Error::Busy)));
        assert_eq!(surface.transcript().len(), 1);
    }

    #[test]
    fn test_search_failure_appends_notice() {
        let (_, mut surface) = mounted();
        let pending = surface.begin_search("q").unwrap();
        let completion = surface.complete_search(
            pending,
            Err(Error::Transport("connection refused".to_string())),
        );
        assert!(matches!(completion, Completion::Failed(Error::Transport(_))));
        assert!(matches!(
            surface.transcript().last(),
            Some(Turn::ErrorNotice { text }) if text == "Could not connect to the server."
        ));
    }

    #[test]
    fn test_load_more_merges_and_rolls_back() {
        let (_, mut surface) = mounted();
        let pending = surface.begin_search("q").unwrap();
        surface.complete_search(pending, page("p0", 25));

        let more = surface.begin_load_more().unwrap().unwrap();
        assert_eq!(more.request.offset, 25);
        let failed = surface.complete_load_more(more, Err(Error::Backend("down".to_string())));
        assert!(matches!(failed, Completion::Failed(_)));
        assert_eq!(surface.cursor().unwrap().offset, 0);
        assert_eq!(surface.transcript().len(), 2);

        let retry = surface.begin_load_more().unwrap().unwrap();
        assert_eq!(retry.request.offset, 25);
        assert!(surface.complete_load_more(retry, page("p1", 3)).is_committed());

        let rs = surface.transcript().last_result_set().unwrap();
        assert_eq!(rs.items.len(), 28);
        assert_eq!(rs.last_offset, 25);
        assert!(!surface.can_load_more());
        assert!(surface.begin_load_more().unwrap().is_none());
    }

    #[test]
    fn test_load_more_without_query_is_noop() {
        let (_, mut surface) = mounted();
        assert!(surface.begin_load_more().unwrap().is_none());
        assert!(!surface.is_loading());
    }

    #[test]
    fn test_refine_replaces_in_place() {
        let (_, mut surface) = mounted();
        let pending = surface.begin_search("q").unwrap();
        surface.complete_search(pending, page("old", 25));
        let more = surface.begin_load_more().unwrap().unwrap();
        surface.complete_load_more(more, page("old2", 25));

        let filters = SearchFilters {
            year_from: 2018,
            ..SearchFilters::new()
        };
        let refine = surface.begin_refine(filters).unwrap().unwrap();
        assert_eq!(refine.request.offset, 0);
        assert_eq!(refine.request.year_from, 2018);
        assert!(surface.complete_refine(refine, page("new", 4)).is_committed());

        assert_eq!(surface.transcript().len(), 2);
        let rs = surface.transcript().last_result_set().unwrap();
        assert_eq!(rs.items.len(), 4);
        assert_eq!(rs.items[0].url, "https://new/0");
    }

    #[test]
    fn test_refine_failure_keeps_results() {
        let (_, mut surface) = mounted();
        let pending = surface.begin_search("q").unwrap();
        surface.complete_search(pending, page("old", 25));
        let before = surface.transcript().clone();

        let narrowed = SearchFilters {
            year_from: 2020,
            ..SearchFilters::new()
        };
        let refine = surface.begin_refine(narrowed).unwrap().unwrap();
        assert_eq!(refine.request.year_from, 2020);
        let completion = surface.complete_refine(refine, Err(Error::Backend("x".to_string())));
        assert!(matches!(completion, Completion::Failed(_)));
        assert_eq!(surface.transcript(), &before);
        assert_eq!(surface.filters(), &SearchFilters::new());

        let more = surface.begin_load_more().unwrap().unwrap();
        assert_eq!(more.request.year_from, SearchFilters::EARLIEST_YEAR);
    }

    #[test]
    fn test_refine_validates_and_stores_without_query() {
        let (_, mut surface) = mounted();
        let bad = SearchFilters {
            year_from: 2022,
            year_to: 2020,
            ..SearchFilters::new()
        };
        assert!(matches!(surface.begin_refine(bad), Err(Error::Validation(_))));

        let recent = SearchFilters {
            sort_by: crate::types::SortOrder::Recency,
            ..SearchFilters::new()
        };
        assert!(surface.begin_refine(recent.clone()).unwrap().is_none());
        assert_eq!(surface.filters(), &recent);
    }

    #[test]
    fn test_filters_survive_remount() {
        let (store, mut surface) = mounted();
        let pending = surface.begin_search("graph").unwrap();
        surface.complete_search(pending, page("g", 25));
        let recent = SearchFilters {
            year_from: 2018,
            ..SearchFilters::new()
        };
        let refine = surface.begin_refine(recent.clone()).unwrap().unwrap();
        surface.complete_refine(refine, page("r", 25));
        assert_eq!(surface.filters(), &recent);

        let mut restored = ExploreSurface::mount(store, &Config::new());
        assert_eq!(restored.filters(), &recent);
        let more = restored.begin_load_more().unwrap().unwrap();
        assert_eq!(more.request.offset, 25);
        assert_eq!(more.request.year_from, 2018);
    }

    #[test]
    fn test_restore_on_mount() {
        let (store, mut surface) = mounted();
        let pending = surface.begin_search("graph").unwrap();
        surface.complete_search(pending, page("g", 25));
        let more = surface.begin_load_more().unwrap().unwrap();
        surface.complete_load_more(more, page("g2", 25));

        let restored = ExploreSurface::mount(store, &Config::new());
        assert_eq!(restored.display_mode(), DisplayMode::Conversation);
        assert_eq!(restored.transcript(), surface.transcript());
        let cursor = restored.cursor().unwrap();
        assert_eq!(cursor.query, "graph");
        assert_eq!(cursor.offset, 25);
    }

    #[test]
    fn test_new_conversation_drops_late_completion() {
        let (store, mut surface) = mounted();
        let pending = surface.begin_search("q").unwrap();
        surface.new_conversation().unwrap();

        assert!(matches!(
            surface.complete_search(pending, page("late", 5)),
            Completion::Stale
        ));
        assert!(surface.transcript().is_empty());
        assert_eq!(surface.display_mode(), DisplayMode::Start);
        assert!(store.get(Surface::Explore.storage_key()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_async_helpers_drive_backend() {
        struct Fixed;

        #[async_trait::async_trait]
        impl SearchBackend for Fixed {
            async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
                page(&format!("o{}", request.offset), 25)
            }
        }

        let (_, mut surface) = mounted();
        assert!(surface.search(&Fixed, "q").await.unwrap().is_committed());
        let more = surface.more(&Fixed).await.unwrap().unwrap();
        assert!(more.is_committed());
        let rs = surface.transcript().last_result_set().unwrap();
        assert_eq!(rs.items[25].url, "https://o25/0");
    }
}
