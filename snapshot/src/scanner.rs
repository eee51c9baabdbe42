//! Recursive directory scanning.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, warn};

use crate::node::{DirectoryNode, FileEntry};

/// Produces point-in-time snapshots of a directory tree.
///
/// Scanning is a pure function of the filesystem at call time; nothing is
/// cached between calls.
#[derive(Debug, Clone)]
pub struct Snapshotter {
    /// Whether to descend into symlinked directories.
    follow_symlinks: bool,
}

impl Snapshotter {
    /// Create a snapshotter that does not follow symlinks.
    pub fn new() -> Self {
        Self {
            follow_symlinks: false,
        }
    }

    /// Enable or disable following symbolic links.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Scan a directory tree depth-first.
    ///
    /// Never fails: a missing or unreadable root produces a childless
    /// placeholder node and a warning, since the tree may change between
    /// watch registration and scan.
    pub fn scan(&self, root: &Path) -> DirectoryNode {
        let start = Instant::now();
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

        if !root.is_dir() {
            warn!("directory does not exist: {}", root.display());
            return DirectoryNode::new(&root);
        }

        let mut visited = HashSet::new();
        let node = self.scan_dir(&root, &mut visited);

        debug!(
            "scanned {} in {:?} ({} files, {} folders)",
            root.display(),
            start.elapsed(),
            node.total_files(),
            node.total_folders(),
        );

        node
    }

    fn scan_dir(&self, path: &Path, visited: &mut HashSet<PathBuf>) -> DirectoryNode {
        let mut node = DirectoryNode::new(path);

        // Symlinked directories can form cycles; a target seen once is not
        // descended into again.
        if let Ok(real) = path.canonicalize() {
            if !visited.insert(real) {
                debug!("skipping already-visited directory: {}", path.display());
                return node;
            }
        }

        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot read directory {}: {e}", path.display());
                return node;
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in entries.filter_map(Result::ok) {
            let child = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_symlink() && !self.follow_symlinks {
                debug!("skipping symlink: {}", child.display());
                continue;
            }

            // `is_dir`/`is_file` resolve symlinks, so followed links sort
            // into the group of their target.
            if child.is_dir() {
                dirs.push(child);
            } else if child.is_file() {
                files.push(child);
            }
        }

        // Directories before files, each group ordered by name.
        dirs.sort();
        files.sort();

        for dir in &dirs {
            node.folders.push(self.scan_dir(dir, visited));
        }

        for file in &files {
            match FileEntry::from_path(file) {
                Ok(entry) => node.files.push(entry),
                Err(e) => debug!("skipping unreadable file {}: {e}", file.display()),
            }
        }

        node
    }
}

impl Default for Snapshotter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_scan_shape() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("alpha")).unwrap();
        fs::create_dir(temp_dir.path().join("beta")).unwrap();
        let mut f = File::create(temp_dir.path().join("alpha/one.log")).unwrap();
        writeln!(f, "entry").unwrap();

        let node = Snapshotter::new().scan(temp_dir.path());

        assert_eq!(node.folders.len(), 2);
        assert_eq!(node.folders[0].name, "alpha");
        assert_eq!(node.folders[0].files.len(), 1);
        assert_eq!(node.folders[0].files[0].name, "one.log");
        assert_eq!(node.folders[1].name, "beta");
        assert!(node.folders[1].files.is_empty());
        assert!(node.folders[1].folders.is_empty());
    }

    #[test]
    fn test_scan_shape_on_wire() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("alpha")).unwrap();
        fs::create_dir(temp_dir.path().join("beta")).unwrap();
        File::create(temp_dir.path().join("alpha/one.log")).unwrap();

        let node = Snapshotter::new().scan(temp_dir.path());
        let value: serde_json::Value = serde_json::from_str(&node.to_json().unwrap()).unwrap();

        let folders = value["folders"].as_array().unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0]["files"].as_array().unwrap().len(), 1);
        assert!(folders[1].get("files").is_none());
        assert!(folders[1].get("folders").is_none());
        assert!(value.get("files").is_none());
    }

    #[test]
    fn test_scan_orders_children_by_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("zoo")).unwrap();
        fs::create_dir(temp_dir.path().join("attic")).unwrap();
        File::create(temp_dir.path().join("z.txt")).unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();

        let node = Snapshotter::new().scan(temp_dir.path());

        let folder_names: Vec<&str> = node.folders.iter().map(|f| f.name.as_str()).collect();
        let file_names: Vec<&str> = node.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folder_names, vec!["attic", "zoo"]);
        assert_eq!(file_names, vec!["a.txt", "z.txt"]);
    }

    #[test]
    fn test_scan_missing_root_returns_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        let node = Snapshotter::new().scan(&missing);

        assert_eq!(node.name, "gone");
        assert_eq!(node.path, missing.display().to_string());
        assert!(node.files.is_empty());
        assert!(node.folders.is_empty());
    }

    #[test]
    fn test_scan_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a/b/c")).unwrap();
        File::create(temp_dir.path().join("a/b/c/deep.txt")).unwrap();

        let node = Snapshotter::new().scan(temp_dir.path());

        assert_eq!(node.total_folders(), 4);
        assert_eq!(node.total_files(), 1);
        assert_eq!(node.folders[0].folders[0].folders[0].files[0].name, "deep.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_symlink_cycle_terminates() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path(), temp_dir.path().join("sub/loop")).unwrap();

        let node = Snapshotter::new().with_follow_symlinks(true).scan(temp_dir.path());

        // The cycle shows up as a childless node instead of recursing.
        let out = &node.folders[0].folders[0];
        assert_eq!(out.name, "loop");
        assert!(out.folders.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks_by_default() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("real.txt")).unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("real.txt"),
            temp_dir.path().join("link.txt"),
        )
        .unwrap();

        let node = Snapshotter::new().scan(temp_dir.path());

        let file_names: Vec<&str> = node.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(file_names, vec!["real.txt"]);
    }
}
