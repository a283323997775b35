//! Per-document render locks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Lock table keyed by document directory.
///
/// Renders of the same document are serialized; different documents render
/// concurrently. An entry lives only while some caller holds or waits on it,
/// so directories that are deleted do not accumulate.
#[derive(Debug, Default)]
pub(crate) struct DocumentLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    /// Run `f` while holding the lock for `dir`.
    pub fn with<T>(&self, dir: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.get(dir);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        drop(lock);
        self.prune(dir);
        result
    }

    /// Lock for `dir`, created on first use.
    fn get(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(dir.to_path_buf()).or_default())
    }

    /// Drop the entry for `dir` if nobody else holds it.
    fn prune(&self, dir: &Path) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(dir).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(dir);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
