//! Classified filesystem change events.

use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::ModifyKind;
use tracing::debug;

use crate::watch_set::WatchSet;

/// A filesystem change classified against the watch set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The entry list of a watched directory changed, or the directory
    /// itself was removed or renamed.
    DirectoryChanged(PathBuf),

    /// The contents or metadata of a watched file changed.
    FileChanged(PathBuf),
}

impl WatchEvent {
    /// Path the event refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::DirectoryChanged(path) | Self::FileChanged(path) => path,
        }
    }
}

/// Classify one raw notify event path against the current watch set.
///
/// Structural changes (create, remove, rename) surface as
/// [`WatchEvent::DirectoryChanged`] on the affected watched directory.
/// Content and metadata changes of watched files surface as
/// [`WatchEvent::FileChanged`]. Everything else is dropped: access events
/// and changes to paths that were never registered.
pub fn classify(set: &WatchSet, kind: &EventKind, path: &Path) -> Option<WatchEvent> {
    match kind {
        // Creates, removes and renames all change a directory's entry
        // list: the subject itself when it is a watched directory, its
        // parent otherwise. A removed file in particular must resurface as
        // a directory change, since its own metadata can no longer be read.
        EventKind::Create(_)
        | EventKind::Remove(_)
        | EventKind::Modify(ModifyKind::Name(_)) => changed_directory(set, path),
        EventKind::Modify(_) => {
            if set.contains_file(path) {
                Some(WatchEvent::FileChanged(path.to_path_buf()))
            } else {
                debug!("ignoring modify event for {}", path.display());
                None
            }
        }
        EventKind::Access(_) => None,
        _ => {
            debug!("ignoring event {kind:?} for {}", path.display());
            None
        }
    }
}

/// The watched directory a structural change belongs to: the path itself if
/// it is a watched directory, otherwise its watched parent.
fn changed_directory(set: &WatchSet, path: &Path) -> Option<WatchEvent> {
    if set.contains_dir(path) {
        return Some(WatchEvent::DirectoryChanged(path.to_path_buf()));
    }

    let parent = path.parent()?;
    if set.contains_dir(parent) {
        Some(WatchEvent::DirectoryChanged(parent.to_path_buf()))
    } else {
        debug!("ignoring event for unwatched path: {}", path.display());
        None
    }
}
