//! Render cache for Folio.
//!
//! Decides whether a rendered artifact is still valid for its markdown source.
//! Validity is tracked with a [`Fingerprint`] (byte size + modification time)
//! captured from the source at the last successful render.
//!
//! - [`RenderCache`]: Staleness check and fingerprint recording
//! - [`SidecarCache`]: Persists fingerprints as JSON files next to the artifact
//! - [`NullCache`]: Caching disabled (everything is stale)
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//! use folio_cache::{DocumentPaths, NullCache, RenderCache};
//!
//! let doc = DocumentPaths::new(
//!     PathBuf::from("docs/guide/index.md"),
//!     PathBuf::from("docs/guide/index.html"),
//!     PathBuf::from("docs/guide/index.json"),
//! );
//! assert!(NullCache.is_stale(&doc)); // NullCache never trusts an artifact
//! ```

mod fingerprint;
mod sidecar;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub use fingerprint::Fingerprint;
pub use sidecar::SidecarCache;

/// On-disk files that make up one rendered document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentPaths {
    /// Markdown source file.
    pub source: PathBuf,
    /// Rendered HTML artifact.
    pub artifact: PathBuf,
    /// Fingerprint record of the last successful render.
    pub record: PathBuf,
}

impl DocumentPaths {
    /// Create paths for a document.
    #[must_use]
    pub fn new(source: PathBuf, artifact: PathBuf, record: PathBuf) -> Self {
        Self {
            source,
            artifact,
            record,
        }
    }
}

/// Staleness detection for rendered documents.
///
/// Implementations must never report a document as fresh unless an artifact
/// exists and was produced from the source as it currently is on disk.
pub trait RenderCache: Send + Sync {
    /// Check whether the document has to be rendered again.
    fn is_stale(&self, doc: &DocumentPaths) -> bool;

    /// Read the fingerprint recorded at the last successful render.
    fn fingerprint(&self, doc: &DocumentPaths) -> Option<Fingerprint>;

    /// Record the fingerprint of a successful render.
    ///
    /// Must only be called after the artifact has been fully written.
    fn record(&self, doc: &DocumentPaths, fingerprint: &Fingerprint) -> io::Result<()>;
}

/// [`RenderCache`] used when caching is disabled.
///
/// Every document is stale; records are discarded.
pub struct NullCache;

impl RenderCache for NullCache {
    fn is_stale(&self, _doc: &DocumentPaths) -> bool {
        true
    }

    fn fingerprint(&self, _doc: &DocumentPaths) -> Option<Fingerprint> {
        None
    }

    fn record(&self, _doc: &DocumentPaths, _fingerprint: &Fingerprint) -> io::Result<()> {
        Ok(())
    }
}

/// Write `contents` to `path` atomically.
///
/// Data goes to a temporary file in the same directory which then replaces
/// `path` by rename, so readers observe either the old or the new file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
