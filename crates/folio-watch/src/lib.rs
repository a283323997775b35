//! Filesystem change watching for Folio sites.
//!
//! [`ChangeWatcher`] subscribes every directory of a content tree and calls a
//! [`ReloadHandler`] whenever a document source (or another trigger file such
//! as the page template) is created, modified, or removed.
//!
//! ```text
//! notify callback ──mpsc──► consumer thread ──► classify ──► ChangeEvent
//!                                  │                              │
//!                                  │      DirCreated / DirDeleted ├──► WatchSet
//!                                  │      trigger file changes    └──► debouncer
//!                                  │                                       │
//!                                  └──── window elapsed ◄──────────────────┘
//!                                              │
//!                                              ▼
//!                                    ReloadHandler::reload()
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use folio_watch::{ChangeWatcher, WatchOptions};
//!
//! let options = WatchOptions::new("site", "index.md").with_trigger("site/template.html");
//! let watcher = ChangeWatcher::start(options, Arc::new(|| println!("reload")))?;
//! // ...
//! watcher.stop();
//! # Ok::<(), folio_watch::WatchError>(())
//! ```

mod debouncer;
mod event;
mod watch_set;
mod watcher;

pub use event::{ChangeEvent, FileChange};
pub use watch_set::WatchSet;
pub use watcher::{ChangeWatcher, DEFAULT_DEBOUNCE, WatchOptions};

/// Receives reload requests from a [`ChangeWatcher`].
///
/// Called on the watcher's consumer thread, at most once per debounce window.
pub trait ReloadHandler: Send + Sync {
    /// Re-render the watched tree.
    fn reload(&self);
}

impl<F> ReloadHandler for F
where
    F: Fn() + Send + Sync,
{
    fn reload(&self) {
        self();
    }
}

/// Error starting a [`ChangeWatcher`].
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Notification backend error.
    #[error("Watch error: {0}")]
    Notify(#[from] notify::Error),
    /// Consumer thread could not be spawned.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
