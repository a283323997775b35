//! Sidecar-file render cache.
//!
//! [`SidecarCache`] stores the [`Fingerprint`] of each rendered document in a
//! small JSON file next to the artifact:
//!
//! ```text
//! {root}/guide/
//! +-- index.md       # source
//! +-- index.html     # artifact
//! +-- index.json     # {"size": 1024, "date": "2024-05-01T10:00:00.5Z"}
//! ```
//!
//! A document is fresh only if the artifact exists, the record parses, and the
//! record matches the current size and modification time of the source
//! exactly. Anything else (missing files, unreadable record, I/O errors) is
//! reported as stale so the next request re-renders.

use std::fs;
use std::io;

use crate::{DocumentPaths, Fingerprint, RenderCache, write_atomic};

/// File-based [`RenderCache`] keeping one JSON record per document.
#[derive(Debug, Default)]
pub struct SidecarCache;

impl SidecarCache {
    /// Create a sidecar cache.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RenderCache for SidecarCache {
    fn is_stale(&self, doc: &DocumentPaths) -> bool {
        if !doc.artifact.is_file() {
            return true;
        }
        let Some(recorded) = self.fingerprint(doc) else {
            return true;
        };
        match Fingerprint::of(&doc.source) {
            Ok(current) => current != recorded,
            Err(e) => {
                tracing::debug!(path = %doc.source.display(), error = %e, "Failed to stat source");
                true
            }
        }
    }

    fn fingerprint(&self, doc: &DocumentPaths) -> Option<Fingerprint> {
        let bytes = fs::read(&doc.record).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                tracing::debug!(path = %doc.record.display(), error = %e, "Ignoring malformed fingerprint record");
                None
            }
        }
    }

    fn record(&self, doc: &DocumentPaths, fingerprint: &Fingerprint) -> io::Result<()> {
        let json = serde_json::to_vec(fingerprint).map_err(io::Error::other)?;
        write_atomic(&doc.record, &json)
    }
}
