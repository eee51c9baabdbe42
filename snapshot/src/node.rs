//! Snapshot tree model and its wire representation.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A directory and everything below it.
///
/// The serialized form omits `files` and `folders` entirely when they are
/// empty, which keeps wire payloads for sparse trees minimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Directory name (final path component).
    pub name: String,

    /// Absolute path of the directory.
    pub path: String,

    /// Files directly inside this directory, ordered by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileEntry>,

    /// Subdirectories, ordered by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<DirectoryNode>,
}

impl DirectoryNode {
    /// Create an empty node for a directory path.
    pub fn new(path: &Path) -> Self {
        Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.display().to_string(),
            files: Vec::new(),
            folders: Vec::new(),
        }
    }

    /// Serialize the node as a compact JSON message.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of files in the whole subtree.
    pub fn total_files(&self) -> usize {
        self.files.len() + self.folders.iter().map(DirectoryNode::total_files).sum::<usize>()
    }

    /// Number of directories in the whole subtree, this node included.
    pub fn total_folders(&self) -> usize {
        1 + self.folders.iter().map(DirectoryNode::total_folders).sum::<usize>()
    }
}

/// Metadata for a single file.
///
/// Also used standalone as the single-file update message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// File name (final path component).
    pub name: String,

    /// Size in bytes.
    pub size: u64,

    /// Modification time, UTC RFC 3339 with seconds precision.
    pub last_modified: String,
}

impl FileEntry {
    /// Build an entry from the file's current metadata.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = path.metadata()?;

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: metadata.len(),
            last_modified: format_modified(&metadata),
        })
    }

    /// Serialize the entry as a compact JSON message.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Format a file's mtime as UTC RFC 3339, e.g. `2026-08-25T10:15:30Z`.
///
/// Falls back to an empty string on platforms without mtime support.
pub(crate) fn format_modified(metadata: &std::fs::Metadata) -> String {
    metadata
        .modified()
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_empty_node_omits_children() {
        let node = DirectoryNode::new(Path::new("/logs"));
        let json = node.to_json().unwrap();

        assert_eq!(json, r#"{"name":"logs","path":"/logs"}"#);
    }

    #[test]
    fn test_node_serializes_children() {
        let mut node = DirectoryNode::new(Path::new("/logs"));
        node.files.push(FileEntry {
            name: "a.log".to_string(),
            size: 12,
            last_modified: "2026-08-25T10:15:30Z".to_string(),
        });
        node.folders.push(DirectoryNode::new(Path::new("/logs/old")));

        let value: serde_json::Value = serde_json::from_str(&node.to_json().unwrap()).unwrap();
        assert_eq!(value["files"][0]["name"], "a.log");
        assert_eq!(value["files"][0]["size"], 12);
        assert_eq!(value["files"][0]["lastModified"], "2026-08-25T10:15:30Z");
        assert_eq!(value["folders"][0]["name"], "old");
        assert!(value["folders"][0].get("files").is_none());
    }

    #[test]
    fn test_node_deserializes_missing_children_as_empty() {
        let node: DirectoryNode = serde_json::from_str(r#"{"name":"logs","path":"/logs"}"#).unwrap();

        assert!(node.files.is_empty());
        assert!(node.folders.is_empty());
    }

    #[test]
    fn test_file_entry_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.txt");
        let mut f = File::create(&path).unwrap();
        write!(f, "hello").unwrap();

        let entry = FileEntry::from_path(&path).unwrap();
        assert_eq!(entry.name, "data.txt");
        assert_eq!(entry.size, 5);
        assert!(entry.last_modified.ends_with('Z'));
    }

    #[test]
    fn test_file_entry_from_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileEntry::from_path(&temp_dir.path().join("gone.txt"));

        assert!(result.is_err());
    }

    #[test]
    fn test_subtree_counts() {
        let mut inner = DirectoryNode::new(Path::new("/a/b"));
        inner.files.push(FileEntry {
            name: "f".to_string(),
            size: 0,
            last_modified: String::new(),
        });

        let mut root = DirectoryNode::new(Path::new("/a"));
        root.folders.push(inner);

        assert_eq!(root.total_files(), 1);
        assert_eq!(root.total_folders(), 2);
    }
}
