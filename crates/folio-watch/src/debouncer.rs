//! Event debouncing for reload requests.
//!
//! Editors often emit several events per save (truncate, write, chmod,
//! rename-over). The debouncer coalesces them per path and only releases a
//! path once no new event has arrived for the debounce window.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::event::FileChange;

/// Pending change waiting for its window to elapse.
struct PendingChange {
    change: FileChange,
    deadline: Instant,
}

/// Per-path debouncer.
///
/// Owned by the watcher's consumer thread, so it needs no locking.
pub(crate) struct EventDebouncer {
    pending: HashMap<PathBuf, PendingChange>,
    window: Duration,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            window,
        }
    }

    /// Record a change, restarting the window for `path`.
    pub fn record(&mut self, path: PathBuf, change: FileChange) {
        let deadline = Instant::now() + self.window;

        match self.pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(PendingChange { change, deadline });
            }
            Entry::Occupied(mut entry) => {
                if let Some(coalesced) = Self::coalesce(entry.get().change, change) {
                    let pending = entry.get_mut();
                    pending.change = coalesced;
                    pending.deadline = deadline;
                } else {
                    // Created then deleted: nothing to render
                    entry.remove();
                }
            }
        }
    }

    /// Coalesce two changes to the same path.
    ///
    /// Returns `None` if both should be discarded.
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: FileChange, new: FileChange) -> Option<FileChange> {
        use FileChange::{Created, Deleted, Modified};

        match (existing, new) {
            (Created, Created) => Some(Created),
            (Created, Modified) => Some(Created),
            (Created, Deleted) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Deleted) => Some(Deleted),

            // Replaced by a new file (atomic save)
            (Deleted, Created) => Some(Modified),
            (Deleted, Modified) => Some(Deleted),
            (Deleted, Deleted) => Some(Deleted),
        }
    }

    /// Remove and return the changes whose window has elapsed.
    pub fn drain_ready(&mut self) -> Vec<(PathBuf, FileChange)> {
        let now = Instant::now();
        self.pending
            .extract_if(|_, pending| pending.deadline <= now)
            .map(|(path, pending)| (path, pending.change))
            .collect()
    }

    /// Number of paths still waiting.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::thread;

    fn path() -> PathBuf {
        PathBuf::from("/site/guide/index.md")
    }

    #[test]
    fn test_single_change_released_after_window() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(10));

        debouncer.record(path(), FileChange::Modified);
        assert!(debouncer.drain_ready().is_empty());

        thread::sleep(Duration::from_millis(15));

        assert_eq!(debouncer.drain_ready(), vec![(path(), FileChange::Modified)]);
        assert!(debouncer.drain_ready().is_empty());
        assert_eq!(debouncer.pending(), 0);
    }

    #[test]
    fn test_burst_coalesces_into_one() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(10));

        debouncer.record(path(), FileChange::Modified);
        debouncer.record(path(), FileChange::Modified);
        debouncer.record(path(), FileChange::Modified);

        thread::sleep(Duration::from_millis(15));

        assert_eq!(debouncer.drain_ready(), vec![(path(), FileChange::Modified)]);
    }

    #[test]
    fn test_new_event_restarts_window() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(40));

        debouncer.record(path(), FileChange::Modified);
        thread::sleep(Duration::from_millis(25));
        debouncer.record(path(), FileChange::Modified);
        thread::sleep(Duration::from_millis(25));

        assert!(debouncer.drain_ready().is_empty());

        thread::sleep(Duration::from_millis(30));
        assert_eq!(debouncer.drain_ready().len(), 1);
    }

    #[test]
    fn test_created_then_deleted_discards_both() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(10));

        debouncer.record(path(), FileChange::Created);
        debouncer.record(path(), FileChange::Deleted);

        thread::sleep(Duration::from_millis(15));

        assert!(debouncer.drain_ready().is_empty());
    }

    #[test]
    fn test_replaced_file_is_released_as_modified() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(10));
        let other = PathBuf::from("/site/b/index.md");

        debouncer.record(path(), FileChange::Deleted);
        debouncer.record(path(), FileChange::Created);
        debouncer.record(other.clone(), FileChange::Modified);
        debouncer.record(other, FileChange::Deleted);
        assert_eq!(debouncer.pending(), 2);

        thread::sleep(Duration::from_millis(15));

        let mut ready = debouncer.drain_ready();
        ready.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            ready,
            vec![
                (PathBuf::from("/site/b/index.md"), FileChange::Deleted),
                (path(), FileChange::Modified),
            ]
        );
        assert_eq!(debouncer.pending(), 0);
    }

    #[test]
    fn test_paths_are_independent() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(10));

        debouncer.record(PathBuf::from("/site/a/index.md"), FileChange::Modified);
        debouncer.record(PathBuf::from("/site/b/index.md"), FileChange::Created);

        thread::sleep(Duration::from_millis(15));

        assert_eq!(debouncer.drain_ready().len(), 2);
    }

    #[test]
    fn test_coalesce_all_combinations() {
        use FileChange::{Created, Deleted, Modified};

        assert_eq!(EventDebouncer::coalesce(Created, Created), Some(Created));
        assert_eq!(EventDebouncer::coalesce(Created, Modified), Some(Created));
        assert_eq!(EventDebouncer::coalesce(Created, Deleted), None);

        assert_eq!(EventDebouncer::coalesce(Modified, Created), Some(Created));
        assert_eq!(EventDebouncer::coalesce(Modified, Modified), Some(Modified));
        assert_eq!(EventDebouncer::coalesce(Modified, Deleted), Some(Deleted));

        assert_eq!(EventDebouncer::coalesce(Deleted, Created), Some(Modified));
        assert_eq!(EventDebouncer::coalesce(Deleted, Modified), Some(Deleted));
        assert_eq!(EventDebouncer::coalesce(Deleted, Deleted), Some(Deleted));
    }
}
