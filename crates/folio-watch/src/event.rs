//! Change events derived from raw notify events.

use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};

use crate::watch_set::WatchSet;

/// Kind of change to a regular file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileChange {
    /// File was created.
    Created,
    /// File content or metadata changed.
    Modified,
    /// File was removed.
    Deleted,
}

/// A discrete filesystem change inside a watched tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A regular file was created (or renamed into place).
    FileCreated(PathBuf),
    /// A regular file was modified.
    FileModified(PathBuf),
    /// A regular file was removed (or renamed away).
    FileDeleted(PathBuf),
    /// A directory was created (or renamed into place).
    DirCreated(PathBuf),
    /// A directory was removed (or renamed away).
    DirDeleted(PathBuf),
}

impl ChangeEvent {
    /// Path the event refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::FileCreated(path)
            | Self::FileModified(path)
            | Self::FileDeleted(path)
            | Self::DirCreated(path)
            | Self::DirDeleted(path) => path,
        }
    }

    /// File change kind, or `None` for directory events.
    #[must_use]
    pub fn file_change(&self) -> Option<FileChange> {
        match self {
            Self::FileCreated(_) => Some(FileChange::Created),
            Self::FileModified(_) => Some(FileChange::Modified),
            Self::FileDeleted(_) => Some(FileChange::Deleted),
            Self::DirCreated(_) | Self::DirDeleted(_) => None,
        }
    }
}

/// Translate a raw notify event into change events.
///
/// Access events and directory modifications are dropped. Renames become a
/// deletion of the old path followed by a creation of the new one. When the
/// backend does not say whether a removed path was a directory, membership
/// in `watched` decides.
pub(crate) fn classify(event: &notify::Event, watched: &WatchSet) -> Vec<ChangeEvent> {
    let removed = |path: &Path| {
        if watched.contains(path) {
            ChangeEvent::DirDeleted(path.to_path_buf())
        } else {
            ChangeEvent::FileDeleted(path.to_path_buf())
        }
    };
    let created = |path: &Path| {
        if path.is_dir() {
            ChangeEvent::DirCreated(path.to_path_buf())
        } else {
            ChangeEvent::FileCreated(path.to_path_buf())
        }
    };

    match event.kind {
        EventKind::Create(CreateKind::Folder) => event
            .paths
            .iter()
            .map(|p| ChangeEvent::DirCreated(p.clone()))
            .collect(),
        EventKind::Create(CreateKind::File) => event
            .paths
            .iter()
            .map(|p| ChangeEvent::FileCreated(p.clone()))
            .collect(),
        EventKind::Create(_) => event.paths.iter().map(|p| created(p)).collect(),

        EventKind::Remove(RemoveKind::Folder) => event
            .paths
            .iter()
            .map(|p| ChangeEvent::DirDeleted(p.clone()))
            .collect(),
        EventKind::Remove(RemoveKind::File) => event
            .paths
            .iter()
            .map(|p| ChangeEvent::FileDeleted(p.clone()))
            .collect(),
        EventKind::Remove(_) => event.paths.iter().map(|p| removed(p)).collect(),

        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event.paths.iter().map(|p| removed(p)).collect(),
            RenameMode::To => event.paths.iter().map(|p| created(p)).collect(),
            RenameMode::Both => match event.paths.as_slice() {
                [from, to] => vec![removed(from), created(to)],
                _ => Vec::new(),
            },
            RenameMode::Any | RenameMode::Other => event
                .paths
                .iter()
                .map(|p| if p.exists() { created(p) } else { removed(p) })
                .collect(),
        },
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(|p| !p.is_dir())
            .map(|p| ChangeEvent::FileModified(p.clone()))
            .collect(),

        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}
