//! On-disk layout of a site.
//!
//! ```text
//! {root}/
//! +-- template.html          # page template
//! +-- index.md               # home page source
//! +-- index.html             # rendered artifact
//! +-- index.json             # fingerprint record
//! +-- guide/
//! |   +-- index.md
//! |   +-- diagram.png        # served as-is
//! +-- status/
//!     +-- 404/index.md       # status pages, never served by path
//!     +-- 500/index.md
//! ```

use std::path::{Path, PathBuf};

use folio_cache::DocumentPaths;

use crate::sandbox::normalize_root;

/// Reserved file and directory names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservedNames {
    /// Document source file name.
    pub source: String,
    /// Rendered artifact file name.
    pub artifact: String,
    /// Fingerprint record file name.
    pub record: String,
    /// Page template file name (at the root).
    pub template: String,
    /// Status page directory name (at the root).
    pub status: String,
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self {
            source: "index.md".to_owned(),
            artifact: "index.html".to_owned(),
            record: "index.json".to_owned(),
            template: "template.html".to_owned(),
            status: "status".to_owned(),
        }
    }
}

/// Paths of a site rooted at one content directory.
#[derive(Clone, Debug)]
pub struct SiteLayout {
    root: PathBuf,
    names: ReservedNames,
}

impl SiteLayout {
    /// Create a layout. `root` is normalized to an absolute path.
    #[must_use]
    pub fn new(root: &Path, names: ReservedNames) -> Self {
        Self {
            root: normalize_root(root),
            names,
        }
    }

    /// Content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserved names.
    #[must_use]
    pub fn names(&self) -> &ReservedNames {
        &self.names
    }

    /// Path of the page template.
    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.names.template)
    }

    /// Root of the status page subtree.
    #[must_use]
    pub fn status_root(&self) -> PathBuf {
        self.root.join(&self.names.status)
    }

    /// Document paths for the document directory `dir`.
    #[must_use]
    pub fn document(&self, dir: &Path) -> DocumentPaths {
        DocumentPaths::new(
            dir.join(&self.names.source),
            dir.join(&self.names.artifact),
            dir.join(&self.names.record),
        )
    }

    /// Check if `path` lies in the status page subtree.
    #[must_use]
    pub fn is_status(&self, path: &Path) -> bool {
        path.starts_with(self.status_root())
    }

    /// Check if the file at `path` must never be served directly.
    ///
    /// Sources, artifacts and records are reserved at any depth. The
    /// template and everything below the status directory are reserved too.
    #[must_use]
    pub fn is_reserved_file(&self, path: &Path) -> bool {
        let reserved_name = path.file_name().is_some_and(|name| {
            name == self.names.source.as_str()
                || name == self.names.artifact.as_str()
                || name == self.names.record.as_str()
        });
        reserved_name || path == self.template_path() || self.is_status(path)
    }
}
