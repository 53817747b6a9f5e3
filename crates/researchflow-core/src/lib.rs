//! Conversational session state for the research assistant client

mod config;
mod document;
mod error;
mod explore;
mod pagination;
mod ports;
mod sequencer;
mod session;
mod transcript;
mod types;
pub mod validate;

pub use config::{Config, API_URL_ENV, DEFAULT_API_URL};
pub use document::{ChatAction, ChatMode, DocumentChatSurface, DocumentContext, PendingChat, PendingExtraction};
pub use error::{Error, Result};
pub use explore::{DisplayMode, ExploreSurface, PendingSearch};
pub use pagination::{ContinuationCursor, PaginationController, PAGE_SIZE};
pub use ports::{
    DocumentBackend, DocumentSource, ExtractedDocument, SearchBackend, SearchPage, SearchRequest,
};
pub use sequencer::{Completion, RequestKind, RequestSequencer, SurfaceStatus, Ticket};
pub use session::{SessionState, SessionStore, Surface};
pub use transcript::Transcript;
pub use types::{ChatMessage, ChatRole, ResultItem, ResultSet, SearchFilters, SortOrder, Turn};
