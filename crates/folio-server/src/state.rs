//! Application state.

use std::sync::Arc;

use folio_site::ContentResolver;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Content resolver for the served site.
    pub(crate) resolver: Arc<ContentResolver>,
}
