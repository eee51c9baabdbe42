//! The set of filesystem paths under observation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Paths currently observed, partitioned into directories and files.
///
/// The partition is what makes event classification possible: a change to a
/// path in the directory partition means the tree's structure moved, while a
/// change to a path in the file partition is a content-level edit.
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    /// Watched directories.
    dirs: HashSet<PathBuf>,

    /// Watched files.
    files: HashSet<PathBuf>,
}

impl WatchSet {
    /// Create an empty watch set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory. Returns false if it was already watched.
    pub fn insert_dir(&mut self, path: PathBuf) -> bool {
        self.dirs.insert(path)
    }

    /// Add a file. Returns false if it was already watched.
    pub fn insert_file(&mut self, path: PathBuf) -> bool {
        self.files.insert(path)
    }

    /// Remove a path from whichever partition holds it.
    pub fn remove(&mut self, path: &Path) -> bool {
        self.dirs.remove(path) || self.files.remove(path)
    }

    /// Whether the path is a watched directory.
    pub fn contains_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    /// Whether the path is a watched file.
    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Whether the path is watched at all.
    pub fn contains(&self, path: &Path) -> bool {
        self.contains_dir(path) || self.contains_file(path)
    }

    /// Number of watched directories.
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    /// Number of watched files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total number of watched paths.
    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    /// Whether nothing is watched.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }

    /// Iterate over every watched path.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.dirs.iter().chain(self.files.iter())
    }

    /// Drop every path absent from the live tree, returning what was removed.
    pub fn retain_live(
        &mut self,
        live_dirs: &HashSet<PathBuf>,
        live_files: &HashSet<PathBuf>,
    ) -> Vec<PathBuf> {
        let mut removed: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter(|p| !live_dirs.contains(*p))
            .cloned()
            .collect();
        removed.extend(
            self.files
                .iter()
                .filter(|p| !live_files.contains(*p))
                .cloned(),
        );

        for path in &removed {
            self.dirs.remove(path);
            self.files.remove(path);
        }

        removed
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.dirs.clear();
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = WatchSet::new();

        assert!(set.insert_dir(PathBuf::from("/a")));
        assert!(!set.insert_dir(PathBuf::from("/a")));
        assert!(set.insert_file(PathBuf::from("/a/f.txt")));
        assert!(!set.insert_file(PathBuf::from("/a/f.txt")));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_partition_membership() {
        let mut set = WatchSet::new();
        set.insert_dir(PathBuf::from("/a"));
        set.insert_file(PathBuf::from("/a/f.txt"));

        assert!(set.contains_dir(Path::new("/a")));
        assert!(!set.contains_file(Path::new("/a")));
        assert!(set.contains_file(Path::new("/a/f.txt")));
        assert!(set.contains(Path::new("/a/f.txt")));
        assert!(!set.contains(Path::new("/b")));
    }

    #[test]
    fn test_retain_live_prunes_stale_paths() {
        let mut set = WatchSet::new();
        set.insert_dir(PathBuf::from("/a"));
        set.insert_dir(PathBuf::from("/a/old"));
        set.insert_file(PathBuf::from("/a/old/f.txt"));
        set.insert_file(PathBuf::from("/a/keep.txt"));

        let live_dirs = HashSet::from([PathBuf::from("/a")]);
        let live_files = HashSet::from([PathBuf::from("/a/keep.txt")]);

        let mut removed = set.retain_live(&live_dirs, &live_files);
        removed.sort();

        assert_eq!(
            removed,
            vec![PathBuf::from("/a/old"), PathBuf::from("/a/old/f.txt")]
        );
        assert_eq!(set.len(), 2);
        assert!(!set.contains(Path::new("/a/old")));
    }

    #[test]
    fn test_clear() {
        let mut set = WatchSet::new();
        set.insert_dir(PathBuf::from("/a"));
        set.insert_file(PathBuf::from("/a/f.txt"));

        set.clear();

        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
