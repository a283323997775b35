//! Request path sandboxing.
//!
//! Maps a public request path (`/guide/intro/`) onto the content root while
//! guaranteeing the result never leaves it. Violations are errors, never
//! clamped to the nearest valid path.

use std::path::{Component, Path, PathBuf};

/// Error returned when a request path escapes the content root.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Path resolves outside the root (`..` segments, absolute paths, or
    /// symbolic links pointing elsewhere).
    #[error("Path escapes content root: {path}")]
    Traversal {
        /// Request path as received.
        path: String,
    },
}

/// Resolve `request` against `root`.
///
/// `root` must already be absolute and normalized (see [`normalize_root`]).
/// A single leading `/` is stripped so URL paths can be passed directly.
/// `.` segments are dropped and `..` segments pop the previous segment;
/// popping past the root is a traversal. If the resolved path exists, its
/// canonical form must also lie inside the canonical root, which rejects
/// symbolic links that point outside.
pub fn resolve(root: &Path, request: &str) -> Result<PathBuf, SandboxError> {
    let traversal = || SandboxError::Traversal {
        path: request.to_owned(),
    };

    let relative = request.strip_prefix('/').unwrap_or(request);
    let mut segments: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => segments.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                segments.pop().ok_or_else(traversal)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }

    let resolved: PathBuf = segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    if !resolved.starts_with(root) {
        return Err(traversal());
    }

    if let Ok(canonical) = resolved.canonicalize() {
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        if !canonical.starts_with(&canonical_root) {
            tracing::warn!(path = %resolved.display(), target = %canonical.display(), "Symbolic link escapes content root");
            return Err(traversal());
        }
    }

    Ok(resolved)
}

/// Make `root` absolute, resolving `.` and `..` lexically, then
/// canonicalize it if it exists.
#[must_use]
pub fn normalize_root(root: &Path) -> PathBuf {
    if let Ok(canonical) = root.canonicalize() {
        return canonical;
    }
    let absolute = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    normalized
}
