//! Set of watched directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories currently subscribed for change notification.
///
/// Owned by the watcher's consumer thread. Insertion and removal are
/// idempotent: adding a watched directory or removing an unwatched one is a
/// no-op.
#[derive(Debug, Default)]
pub struct WatchSet {
    dirs: BTreeSet<PathBuf>,
}

impl WatchSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dir`. Returns `true` if it was not already present.
    pub fn insert(&mut self, dir: PathBuf) -> bool {
        self.dirs.insert(dir)
    }

    /// Remove `dir` and every directory below it.
    ///
    /// Returns the removed paths, deepest first.
    pub fn remove_tree(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut removed: Vec<PathBuf> = self
            .dirs
            .range(dir.to_path_buf()..)
            .take_while(|watched| watched.starts_with(dir))
            .cloned()
            .collect();
        for path in &removed {
            self.dirs.remove(path);
        }
        removed.reverse();
        removed
    }

    /// Check if `dir` is watched.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    /// Number of watched directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Check if nothing is watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Iterate over watched directories in path order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Remove and return every watched directory.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.dirs).into_iter().collect()
    }
}

/// `root` and every directory below it, parents before children.
///
/// Symbolic links are not followed. Unreadable directories are included but
/// not descended into.
pub(crate) fn directory_tree(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        match fs::read_dir(&dir) {
            Ok(entries) => {
                let mut children: Vec<PathBuf> = entries
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
                    .map(|entry| entry.path())
                    .collect();
                children.sort_unstable_by(|a, b| b.cmp(a));
                stack.extend(children);
            }
            Err(e) => {
                tracing::debug!(path = %dir.display(), error = %e, "Failed to read directory");
            }
        }
        dirs.push(dir);
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = WatchSet::new();

        assert!(set.insert(PathBuf::from("/site")));
        assert!(!set.insert(PathBuf::from("/site")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_tree_removes_descendants_only() {
        let mut set = WatchSet::new();
        for dir in ["/site", "/site/a", "/site/a/b", "/site/ab", "/site/c"] {
            set.insert(PathBuf::from(dir));
        }

        let removed = set.remove_tree(Path::new("/site/a"));

        assert_eq!(
            removed,
            vec![PathBuf::from("/site/a/b"), PathBuf::from("/site/a")]
        );
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Path::new("/site"), Path::new("/site/ab"), Path::new("/site/c")]
        );
    }

    #[test]
    fn test_remove_tree_is_idempotent() {
        let mut set = WatchSet::new();
        set.insert(PathBuf::from("/site/a"));

        assert_eq!(set.remove_tree(Path::new("/site/a")).len(), 1);
        assert!(set.remove_tree(Path::new("/site/a")).is_empty());
        assert!(set.remove_tree(Path::new("/elsewhere")).is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn test_drain_empties_set() {
        let mut set = WatchSet::new();
        set.insert(PathBuf::from("/a"));
        set.insert(PathBuf::from("/b"));

        assert_eq!(set.drain().len(), 2);
        assert!(set.is_empty());
    }

    #[test]
    fn test_directory_tree_lists_parents_first() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::create_dir(tmp.path().join("c")).unwrap();
        fs::write(tmp.path().join("index.md"), "x").unwrap();

        let tree = directory_tree(tmp.path());

        assert_eq!(
            tree,
            vec![
                tmp.path().to_path_buf(),
                tmp.path().join("a"),
                tmp.path().join("a/b"),
                tmp.path().join("c"),
            ]
        );
    }

    #[test]
    fn test_directory_tree_missing_root() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");

        assert_eq!(directory_tree(&missing), vec![missing]);
    }
}
