//! Request-to-artifact resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use folio_cache::{NullCache, RenderCache, SidecarCache};
use folio_render::{DocumentRenderer, RenderError, RendererConfig, SiteTemplate};
use folio_watch::{ChangeWatcher, ReloadHandler, WatchError, WatchOptions};
use rayon::prelude::*;

use crate::layout::{ReservedNames, SiteLayout};
use crate::locks::DocumentLocks;
use crate::sandbox::{self, SandboxError};

/// Error returned by [`ContentResolver`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Request path escapes the content root.
    #[error(transparent)]
    Traversal(#[from] SandboxError),
    /// Nothing servable at the requested path.
    #[error("Not found: {path}")]
    NotFound {
        /// Request path as received.
        path: String,
    },
    /// Site is misconfigured (missing root, template, or status page).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Document failed to render and no previous artifact exists.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Path is neither a regular file nor a directory.
    #[error("Unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),
    /// Change watcher could not be started.
    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Settings for [`ContentResolver::new`].
#[derive(Clone, Debug)]
pub struct SiteOptions {
    /// Content root.
    pub root: PathBuf,
    /// Site display name, substituted for `$name$` in the template.
    pub site_name: String,
    /// Persist fingerprints and skip rendering fresh documents.
    ///
    /// When disabled every request re-renders its document.
    pub cache: bool,
    /// Reserved file and directory names.
    pub names: ReservedNames,
}

impl SiteOptions {
    /// Create options with caching enabled and default reserved names.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, site_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            site_name: site_name.into(),
            cache: true,
            names: ReservedNames::default(),
        }
    }

    /// Enable or disable the render cache.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Override reserved names.
    #[must_use]
    pub fn with_names(mut self, names: ReservedNames) -> Self {
        self.names = names;
        self
    }
}

/// Outcome of [`ContentResolver::reload`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    /// Documents rendered successfully.
    pub rendered: usize,
    /// Documents that failed to render.
    pub failed: usize,
}

/// Single entry point from the HTTP layer into a site's content.
///
/// Resolves request paths and status codes to servable files, rendering
/// documents on demand when their source has changed. Optionally runs a
/// [`ChangeWatcher`] that re-renders the whole site when sources change.
///
/// # Thread Safety
///
/// All methods take `&self` and may be called concurrently:
/// - Renders of the same document are serialized (single-flight); callers
///   waiting on a render reuse its result instead of rendering again
/// - Different documents render in parallel
/// - The watcher slot is guarded by a mutex, so start/stop are idempotent
pub struct ContentResolver {
    engine: Arc<Engine>,
    watcher: Mutex<Option<ChangeWatcher>>,
}

impl ContentResolver {
    /// Create a resolver for the site described by `options`.
    ///
    /// Fails if the root is not a directory or the template is missing or
    /// unreadable.
    pub fn new(options: SiteOptions) -> Result<Self, ContentError> {
        let layout = SiteLayout::new(&options.root, options.names);
        if !layout.root().is_dir() {
            return Err(ContentError::Configuration(format!(
                "Content root is not a directory: {}",
                layout.root().display()
            )));
        }
        let template_path = layout.template_path();
        SiteTemplate::load(&template_path).map_err(|e| {
            ContentError::Configuration(format!(
                "Cannot read template {}: {e}",
                template_path.display()
            ))
        })?;

        let cache: Arc<dyn RenderCache> = if options.cache {
            Arc::new(SidecarCache::new())
        } else {
            Arc::new(NullCache)
        };
        let renderer = DocumentRenderer::new(
            RendererConfig {
                site_name: options.site_name,
                template_path,
                source_name: layout.names().source.clone(),
            },
            cache,
        );

        Ok(Self {
            engine: Arc::new(Engine {
                layout,
                renderer,
                locks: DocumentLocks::default(),
            }),
            watcher: Mutex::new(None),
        })
    }

    /// Site layout.
    #[must_use]
    pub fn layout(&self) -> &SiteLayout {
        &self.engine.layout
    }

    /// Resolve a request path to a servable file.
    ///
    /// - Directory with a source: rendered if stale, returns the artifact
    /// - Directory without a source: [`ContentError::NotFound`]
    /// - Regular file: returned as-is unless it is a reserved file
    /// - Anything else: [`ContentError::Unsupported`]
    ///
    /// If rendering fails the previous artifact is served when one exists;
    /// otherwise the document is reported as not found.
    pub fn from_path(&self, path: &str) -> Result<PathBuf, ContentError> {
        self.engine.from_path(path)
    }

    /// Resolve the status page for `code`, rendering it if stale.
    ///
    /// A missing status page source is a configuration error.
    pub fn from_status(&self, code: u16) -> Result<PathBuf, ContentError> {
        self.engine.from_status(code)
    }

    /// Re-render every document under the root, regardless of staleness.
    ///
    /// Documents render in parallel. Failures are logged and counted; they
    /// never abort the rest of the reload.
    pub fn reload(&self) -> ReloadSummary {
        self.engine.reload_all()
    }

    /// Start watching the content tree. Does nothing if already watching.
    pub fn start_watcher(&self) -> Result<(), ContentError> {
        let mut slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(());
        }
        let layout = &self.engine.layout;
        let options = WatchOptions::new(layout.root(), layout.names().source.clone())
            .with_trigger(layout.template_path());
        let handler: Arc<dyn ReloadHandler> = Arc::clone(&self.engine) as Arc<dyn ReloadHandler>;
        *slot = Some(ChangeWatcher::start(options, handler)?);
        Ok(())
    }

    /// Stop watching. Does nothing if not watching.
    pub fn stop_watcher(&self) {
        let watcher = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(watcher) = watcher {
            watcher.stop();
        }
    }

    /// Check if the change watcher is running.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Rendering state shared with the watcher thread.
struct Engine {
    layout: SiteLayout,
    renderer: DocumentRenderer,
    locks: DocumentLocks,
}

impl Engine {
    fn from_path(&self, path: &str) -> Result<PathBuf, ContentError> {
        let not_found = || ContentError::NotFound {
            path: path.to_owned(),
        };

        let resolved = sandbox::resolve(self.layout.root(), path)?;
        let metadata = fs::metadata(&resolved).map_err(|_| not_found())?;
        // Reserved checks apply to the link target as well as the link
        let target = resolved.canonicalize().map_err(|_| not_found())?;

        if metadata.is_dir() {
            if self.layout.is_status(&resolved) || self.layout.is_status(&target) {
                return Err(not_found());
            }
            if !self.layout.document(&resolved).source.is_file() {
                return Err(not_found());
            }
            self.render_if_stale(&resolved).map_err(|_| not_found())
        } else if metadata.is_file() {
            if self.layout.is_reserved_file(&resolved)
                || self.layout.is_reserved_file(&target)
            {
                return Err(not_found());
            }
            Ok(resolved)
        } else {
            Err(ContentError::Unsupported(resolved))
        }
    }

    fn from_status(&self, code: u16) -> Result<PathBuf, ContentError> {
        let dir = sandbox::resolve(&self.layout.status_root(), &code.to_string())?;
        let doc = self.layout.document(&dir);
        if !doc.source.is_file() {
            return Err(ContentError::Configuration(format!(
                "Missing status page for {code}: {}",
                doc.source.display()
            )));
        }
        Ok(self.render_if_stale(&dir)?)
    }

    /// Render the document in `dir` if stale and return its artifact.
    ///
    /// A failed render falls back to the previous artifact if there is one.
    fn render_if_stale(&self, dir: &Path) -> Result<PathBuf, RenderError> {
        let doc = self.layout.document(dir);
        let cache = self.renderer.cache();
        if !cache.is_stale(&doc) {
            return Ok(doc.artifact);
        }

        self.locks.with(dir, || {
            // Another request may have rendered while we waited
            if !cache.is_stale(&doc) {
                return Ok(doc.artifact);
            }

            match self.renderer.render(&doc) {
                Ok(()) => Ok(doc.artifact),
                Err(e) if doc.artifact.is_file() => {
                    tracing::warn!(path = %doc.source.display(), error = %e, "Render failed, serving previous artifact");
                    Ok(doc.artifact)
                }
                Err(e) => {
                    tracing::warn!(path = %doc.source.display(), error = %e, "Render failed");
                    Err(e)
                }
            }
        })
    }

    /// Render the document in `dir` unconditionally.
    fn render_locked(&self, dir: &Path) -> Result<(), RenderError> {
        self.locks
            .with(dir, || self.renderer.render(&self.layout.document(dir)))
    }

    fn reload_all(&self) -> ReloadSummary {
        let dirs = document_dirs(self.layout.root(), &self.layout.names().source);

        let failed = dirs
            .par_iter()
            .filter(|dir| match self.render_locked(dir) {
                Ok(()) => false,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Failed to render document");
                    true
                }
            })
            .count();

        let summary = ReloadSummary {
            rendered: dirs.len() - failed,
            failed,
        };
        tracing::info!(
            root = %self.layout.root().display(),
            rendered = summary.rendered,
            failed = summary.failed,
            "Reloaded site"
        );
        summary
    }
}

impl ReloadHandler for Engine {
    fn reload(&self) {
        self.reload_all();
    }
}

/// Every directory under `root` (inclusive) holding a `source_name` file.
///
/// Symbolic links are not followed.
fn document_dirs(root: &Path, source_name: &str) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if dir.join(source_name).is_file() {
            documents.push(dir.clone());
        }
        match fs::read_dir(&dir) {
            Ok(entries) => stack.extend(
                entries
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
                    .map(|entry| entry.path()),
            ),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory");
            }
        }
    }

    documents
}
