//! Directory watcher driving reloads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::debouncer::EventDebouncer;
use crate::event::{ChangeEvent, FileChange, classify};
use crate::watch_set::{WatchSet, directory_tree};
use crate::{ReloadHandler, WatchError};

/// Default debounce window for reload requests.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// How long the consumer blocks waiting for events before checking timers.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for [`ChangeWatcher::start`].
#[derive(Clone, Debug)]
pub struct WatchOptions {
    /// Root of the watched tree.
    pub root: PathBuf,
    /// File name that triggers a reload wherever it changes (e.g. `index.md`).
    pub source_name: String,
    /// Additional files that trigger a reload (e.g. the page template).
    pub extra_triggers: Vec<PathBuf>,
    /// Quiet period before a burst of changes results in a reload.
    pub debounce: Duration,
}

impl WatchOptions {
    /// Create options with the default debounce window and no extra triggers.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, source_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            source_name: source_name.into(),
            extra_triggers: Vec::new(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Add a file whose changes trigger a reload.
    #[must_use]
    pub fn with_trigger(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_triggers.push(path.into());
        self
    }

    /// Set the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Messages delivered to the consumer thread.
enum Message {
    Notify(notify::Result<notify::Event>),
    Shutdown,
}

/// Watches a content tree and calls a [`ReloadHandler`] when sources change.
///
/// Every directory is subscribed individually (non-recursively). New
/// directories are subscribed as they appear and deleted ones are dropped.
///
/// Uses RAII: dropping the watcher stops it and waits for the consumer
/// thread to finish.
pub struct ChangeWatcher {
    tx: mpsc::Sender<Message>,
    thread: Option<JoinHandle<()>>,
}

impl ChangeWatcher {
    /// Subscribe every directory under `options.root` and start the consumer
    /// thread.
    pub fn start(
        options: WatchOptions,
        handler: Arc<dyn ReloadHandler>,
    ) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();

        let callback_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            // Receiver gone means the consumer is shutting down
            let _ = callback_tx.send(Message::Notify(res));
        })?;

        let mut watched = WatchSet::new();
        watcher.watch(&options.root, RecursiveMode::NonRecursive)?;
        watched.insert(options.root.clone());
        for dir in directory_tree(&options.root).into_iter().skip(1) {
            subscribe(&mut watcher, &mut watched, dir);
        }
        tracing::info!(
            root = %options.root.display(),
            directories = watched.len(),
            "Watching for changes"
        );

        let consumer = Consumer {
            debouncer: EventDebouncer::new(options.debounce),
            triggers: options.extra_triggers.into_iter().collect(),
            source_name: options.source_name,
            watcher,
            watched,
            handler,
        };
        let thread = thread::Builder::new()
            .name("folio-watch".to_owned())
            .spawn(move || consumer.run(&rx))?;

        Ok(Self {
            tx,
            thread: Some(thread),
        })
    }

    /// Stop watching and wait for the consumer thread to exit.
    ///
    /// Every directory is unsubscribed before this returns.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // Send fails only if the consumer already exited
        let _ = self.tx.send(Message::Shutdown);
        if thread.join().is_err() {
            tracing::error!("Watcher thread panicked");
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Subscribe `dir`, recording it in `watched` on success.
fn subscribe(watcher: &mut RecommendedWatcher, watched: &mut WatchSet, dir: PathBuf) {
    if watched.contains(&dir) {
        return;
    }
    match watcher.watch(&dir, RecursiveMode::NonRecursive) {
        Ok(()) => {
            watched.insert(dir);
        }
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to watch directory");
        }
    }
}

/// State owned by the consumer thread.
struct Consumer {
    watcher: RecommendedWatcher,
    watched: WatchSet,
    debouncer: EventDebouncer,
    source_name: String,
    triggers: HashSet<PathBuf>,
    handler: Arc<dyn ReloadHandler>,
}

impl Consumer {
    fn run(mut self, rx: &mpsc::Receiver<Message>) {
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Message::Notify(Ok(event))) => {
                    for change in classify(&event, &self.watched) {
                        self.apply(change);
                    }
                }
                Ok(Message::Notify(Err(e))) => {
                    tracing::warn!(error = %e, "Watch error");
                }
                Ok(Message::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            let ready = self.debouncer.drain_ready();
            if !ready.is_empty() {
                for (path, change) in &ready {
                    tracing::debug!(path = %path.display(), ?change, "Source changed");
                }
                let deleted = ready
                    .iter()
                    .filter(|(_, change)| *change == FileChange::Deleted)
                    .count();
                tracing::info!(
                    changed = ready.len(),
                    deleted,
                    pending = self.debouncer.pending(),
                    "Sources changed, reloading"
                );
                self.handler.reload();
            }
        }

        for dir in self.watched.drain().into_iter().rev() {
            if let Err(e) = self.watcher.unwatch(&dir) {
                tracing::debug!(path = %dir.display(), error = %e, "Failed to unwatch directory");
            }
        }
        tracing::info!("Stopped watching");
    }

    fn apply(&mut self, change: ChangeEvent) {
        tracing::debug!(?change, "Filesystem change");
        match change {
            ChangeEvent::DirCreated(dir) => self.add_tree(&dir),
            ChangeEvent::DirDeleted(dir) => {
                for removed in self.watched.remove_tree(&dir) {
                    // The backend usually drops watches on deleted directories itself
                    let _ = self.watcher.unwatch(&removed);
                }
            }
            file => {
                if let Some(kind) = file.file_change()
                    && self.is_trigger(file.path())
                {
                    self.debouncer.record(file.path().to_path_buf(), kind);
                }
            }
        }
    }

    /// Subscribe a new directory and everything already inside it.
    ///
    /// Files created before the subscription took effect produce no events,
    /// so any source found here requests a reload directly.
    fn add_tree(&mut self, dir: &Path) {
        for sub in directory_tree(dir) {
            let source = sub.join(&self.source_name);
            subscribe(&mut self.watcher, &mut self.watched, sub);
            if source.is_file() {
                self.debouncer.record(source, FileChange::Created);
            }
        }
    }

    fn is_trigger(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name == self.source_name.as_str())
            || self.triggers.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ReloadHandler for Counter {
        fn reload(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Counter {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn start(root: &Path) -> (ChangeWatcher, Arc<Counter>) {
        let counter = Arc::new(Counter::default());
        let options = WatchOptions::new(root, "index.md")
            .with_trigger(root.join("template.html"))
            .with_debounce(Duration::from_millis(50));
        let watcher =
            ChangeWatcher::start(options, Arc::clone(&counter) as Arc<dyn ReloadHandler>).unwrap();
        (watcher, counter)
    }

    /// Canonical temp dir so event paths match trigger paths on macOS.
    fn site() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        (tmp, root)
    }

    #[test]
    fn test_options_builder() {
        let options = WatchOptions::new("/site", "index.md")
            .with_trigger("/site/template.html")
            .with_debounce(Duration::from_millis(5));

        assert_eq!(options.root, PathBuf::from("/site"));
        assert_eq!(options.source_name, "index.md");
        assert_eq!(options.extra_triggers, vec![PathBuf::from("/site/template.html")]);
        assert_eq!(options.debounce, Duration::from_millis(5));
    }

    #[test]
    fn test_start_missing_root_fails() {
        let (_tmp, root) = site();
        let options = WatchOptions::new(root.join("missing"), "index.md");

        let result = ChangeWatcher::start(options, Arc::new(Counter::default()));

        assert!(matches!(result, Err(WatchError::Notify(_))));
    }

    #[test]
    fn test_stop_is_clean_without_events() {
        let (_tmp, root) = site();
        fs::create_dir_all(root.join("a/b")).unwrap();

        let (watcher, counter) = start(&root);
        watcher.stop();

        assert_eq!(counter.count(), 0);
    }

    #[test]
    #[ignore = "timing-sensitive, depends on filesystem notification latency"]
    fn test_source_edit_triggers_single_reload() {
        let (_tmp, root) = site();
        fs::write(root.join("index.md"), "# One").unwrap();
        let (watcher, counter) = start(&root);
        thread::sleep(Duration::from_millis(100));

        fs::write(root.join("index.md"), "# Two").unwrap();
        thread::sleep(Duration::from_millis(10));
        fs::write(root.join("index.md"), "# Three").unwrap();
        thread::sleep(Duration::from_millis(300));

        assert_eq!(counter.count(), 1);
        watcher.stop();
    }

    #[test]
    #[ignore = "timing-sensitive, depends on filesystem notification latency"]
    fn test_non_trigger_files_are_ignored() {
        let (_tmp, root) = site();
        let (watcher, counter) = start(&root);
        thread::sleep(Duration::from_millis(100));

        fs::write(root.join("notes.txt"), "x").unwrap();
        fs::write(root.join("index.html"), "x").unwrap();
        thread::sleep(Duration::from_millis(300));

        assert_eq!(counter.count(), 0);
        watcher.stop();
    }

    #[test]
    #[ignore = "timing-sensitive, depends on filesystem notification latency"]
    fn test_template_edit_triggers_reload() {
        let (_tmp, root) = site();
        fs::write(root.join("template.html"), "$content$").unwrap();
        let (watcher, counter) = start(&root);
        thread::sleep(Duration::from_millis(100));

        fs::write(root.join("template.html"), "<main>$content$</main>").unwrap();
        thread::sleep(Duration::from_millis(300));

        assert_eq!(counter.count(), 1);
        watcher.stop();
    }

    #[test]
    #[ignore = "timing-sensitive, depends on filesystem notification latency"]
    fn test_new_directory_is_watched() {
        let (_tmp, root) = site();
        let (watcher, counter) = start(&root);
        thread::sleep(Duration::from_millis(100));

        fs::create_dir(root.join("post")).unwrap();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(counter.count(), 0);

        fs::write(root.join("post/index.md"), "# Post").unwrap();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(counter.count(), 1);

        watcher.stop();
    }

    #[test]
    #[ignore = "timing-sensitive, depends on filesystem notification latency"]
    fn test_stopped_watcher_does_not_reload() {
        let (_tmp, root) = site();
        let (watcher, counter) = start(&root);
        thread::sleep(Duration::from_millis(100));

        watcher.stop();
        fs::write(root.join("index.md"), "# New").unwrap();
        thread::sleep(Duration::from_millis(300));

        assert_eq!(counter.count(), 0);
    }
}
