//! Watch registration and lifecycle management.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, WatchError};
use crate::event::{self, WatchEvent};
use crate::watch_set::WatchSet;

/// Buffered events between the notify callback and the consumer.
const EVENT_BUFFER: usize = 1000;

/// Registers directory trees with the OS watcher and classifies raw
/// notifications into [`WatchEvent`]s.
///
/// Every directory and file gets its own non-recursive watch, so the watch
/// set mirrors exactly what the last [`register_tree`](Self::register_tree)
/// pass saw on disk.
pub struct WatchSetManager {
    /// Paths currently watched, shared with the notify callback.
    watch_set: Arc<RwLock<WatchSet>>,

    /// Internal notify watcher, present while started.
    watcher: Option<RecommendedWatcher>,

    /// Event sender handed to the notify callback.
    event_tx: mpsc::Sender<WatchEvent>,

    /// Follow symbolic links during registration traversals.
    follow_symlinks: bool,
}

impl WatchSetManager {
    /// Create a manager and the receiver for its classified events.
    pub fn new() -> (Self, mpsc::Receiver<WatchEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        let manager = Self {
            watch_set: Arc::new(RwLock::new(WatchSet::new())),
            watcher: None,
            event_tx,
            follow_symlinks: false,
        };

        (manager, event_rx)
    }

    /// Follow symbolic links when walking trees for registration. Keep
    /// this in line with the scanner, so everything a snapshot reports is
    /// also watched.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Start the OS watcher. Idempotent; nothing is watched until
    /// [`register_tree`](Self::register_tree) is called.
    pub fn start(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(());
        }

        let watch_set = Arc::clone(&self.watch_set);
        let event_tx = self.event_tx.clone();

        let watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(raw) => {
                    for path in &raw.paths {
                        let classified = {
                            let set = watch_set.blocking_read();
                            event::classify(&set, &raw.kind, path)
                        };

                        if let Some(watch_event) = classified {
                            if let Err(e) = event_tx.blocking_send(watch_event) {
                                error!("failed to send watch event: {e}");
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("watch error: {e}");
                }
            },
        )?;

        self.watcher = Some(watcher);
        info!("watch set manager started");

        Ok(())
    }

    /// Stop the OS watcher and clear the watch set. Idempotent.
    pub async fn stop(&mut self) {
        // Dropping the watcher releases every OS watch; the drop happens
        // before the lock is taken, because its event thread may be blocked
        // on a read of the watch set.
        if self.watcher.take().is_some() {
            info!("watch set manager stopped");
        }

        self.watch_set.write().await.clear();
    }

    /// Whether the OS watcher is active.
    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Register every directory and file under `root` in one traversal,
    /// pruning watched paths that no longer exist on disk.
    ///
    /// Idempotent: already-registered paths are left untouched. Paths that
    /// cannot be watched are logged and skipped; the next pass retries them.
    pub async fn register_tree(&mut self, root: &Path) -> Result<RegisterOutcome> {
        let watcher = self.watcher.as_mut().ok_or(WatchError::NotStarted)?;

        let start = Instant::now();
        let mut live_dirs = HashSet::new();
        let mut live_files = HashSet::new();

        // flatten() skips unreadable entries and, when following links,
        // the error walkdir reports for a symlink cycle.
        for entry in WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .flatten()
        {
            let file_type = entry.file_type();
            if file_type.is_dir() {
                live_dirs.insert(entry.into_path());
            } else if file_type.is_file() {
                live_files.insert(entry.into_path());
            }
        }

        // The notify callback takes this lock, and watch()/unwatch() wait
        // on the callback thread: membership changes happen in one short
        // critical section, OS watch calls strictly outside it.
        let (stale, new_dirs, new_files) = {
            let mut set = self.watch_set.write().await;

            let stale = set.retain_live(&live_dirs, &live_files);

            let mut new_dirs = Vec::new();
            for dir in live_dirs {
                if set.insert_dir(dir.clone()) {
                    new_dirs.push(dir);
                }
            }

            let mut new_files = Vec::new();
            for file in live_files {
                if set.insert_file(file.clone()) {
                    new_files.push(file);
                }
            }

            (stale, new_dirs, new_files)
        };

        let mut outcome = RegisterOutcome::default();

        for path in &stale {
            let _ = watcher.unwatch(path);
            debug!("stopped watching: {}", path.display());
            outcome.removed += 1;
        }

        for dir in new_dirs {
            match watcher.watch(&dir, RecursiveMode::NonRecursive) {
                Ok(()) => outcome.dirs_added += 1,
                Err(e) => {
                    warn!("failed to watch {}: {e}", dir.display());
                    self.watch_set.write().await.remove(&dir);
                }
            }
        }

        for file in new_files {
            match watcher.watch(&file, RecursiveMode::NonRecursive) {
                Ok(()) => outcome.files_added += 1,
                Err(e) => {
                    warn!("failed to watch {}: {e}", file.display());
                    self.watch_set.write().await.remove(&file);
                }
            }
        }

        info!(
            "watch set for {} updated in {:?} (dirs added: {}, files added: {}, removed: {}, total: {})",
            root.display(),
            start.elapsed(),
            outcome.dirs_added,
            outcome.files_added,
            outcome.removed,
            self.watch_set.read().await.len(),
        );

        Ok(outcome)
    }

    /// Whether a path is currently watched.
    pub async fn is_watching(&self, path: &Path) -> bool {
        self.watch_set.read().await.contains(path)
    }

    /// Statistics about the current watch set.
    pub async fn stats(&self) -> WatchStats {
        let set = self.watch_set.read().await;

        WatchStats {
            directories: set.dir_count(),
            files: set.file_count(),
        }
    }
}

/// Result of a tree registration pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterOutcome {
    /// Directories newly watched.
    pub dirs_added: usize,

    /// Files newly watched.
    pub files_added: usize,

    /// Stale paths unwatched and removed.
    pub removed: usize,
}

/// Statistics about the watch set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchStats {
    /// Watched directories.
    pub directories: usize,

    /// Watched files.
    pub files: usize,
}
