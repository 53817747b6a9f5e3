//! Namespaced storage keys

/// Authentication token issued by the login endpoint
pub const AUTH_TOKEN: &str = "researchflow.auth.token";

/// Saved (bookmarked) articles
pub const SAVED_ITEMS: &str = "researchflow.saved";

/// Transcript of the search-exploration surface
pub const EXPLORE_HISTORY: &str = "researchflow.history.explore";

/// Transcript and context of the document-chat surface
pub const DOCUMENT_HISTORY: &str = "researchflow.history.document";

/// Keys that belong to the signed-in user and go away on logout
pub const USER_SCOPED: [&str; 4] = [AUTH_TOKEN, SAVED_ITEMS, EXPLORE_HISTORY, DOCUMENT_HISTORY];
