//! Builds change messages and sends them while the connection is up.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use dirstream_connection::{ConnectionError, ConnectionManager};
use dirstream_snapshot::{FileEntry, Snapshotter};

use crate::error::Result;

/// Turns filesystem changes into outbound frames.
///
/// Directory-level changes become full snapshots of the observed root;
/// file-level changes become single metadata updates. While the connection
/// is down everything is dropped, never queued: the snapshot sent on the
/// next connect carries the current state anyway.
pub struct ChangeNotifier {
    /// Root of the observed tree; every snapshot starts here.
    root: PathBuf,

    /// Scanner used for full-tree snapshots.
    snapshotter: Snapshotter,

    /// Log full payloads before sending.
    log_payloads: bool,
}

impl ChangeNotifier {
    /// Create a notifier for the tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, snapshotter: Snapshotter) -> Self {
        Self {
            root: root.into(),
            snapshotter,
            log_payloads: false,
        }
    }

    /// Log every payload at debug level before sending it.
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Serialize a fresh snapshot of the observed root.
    pub fn snapshot_message(&self) -> Result<String> {
        let tree = self.snapshotter.scan(&self.root);
        let json = tree.to_json()?;
        if self.log_payloads {
            debug!("snapshot payload: {json}");
        }
        Ok(json)
    }

    /// Serialize the current metadata of one file.
    pub fn file_update_message(&self, path: &Path) -> Result<String> {
        let entry = FileEntry::from_path(path)?;
        let json = entry.to_json()?;
        if self.log_payloads {
            debug!("file update payload: {json}");
        }
        Ok(json)
    }

    /// Send a full snapshot of the observed root.
    ///
    /// Skipped entirely while the connection is down; re-scanning a tree
    /// nobody will receive is wasted work.
    pub async fn directory_changed(&self, connection: &ConnectionManager) -> Result<()> {
        if !connection.is_connected().await {
            warn!(
                "not connected, skipping snapshot of {}",
                self.root.display()
            );
            return Ok(());
        }

        let message = self.snapshot_message()?;
        debug!("sending full snapshot ({} bytes)", message.len());
        self.send_or_drop(connection, message).await
    }

    /// Send a metadata update for one changed file.
    ///
    /// A file that can no longer be read (deleted between event and
    /// handling) is skipped; the accompanying directory event already
    /// resends the full tree.
    pub async fn file_changed(&self, connection: &ConnectionManager, path: &Path) -> Result<()> {
        let message = match self.file_update_message(path) {
            Ok(message) => message,
            Err(e) => {
                warn!("skipping update for {}: {e}", path.display());
                return Ok(());
            }
        };

        debug!("sending file update for {}", path.display());
        self.send_or_drop(connection, message).await
    }

    /// Send one frame, dropping it if the connection went down meanwhile.
    async fn send_or_drop(&self, connection: &ConnectionManager, message: String) -> Result<()> {
        match connection.send(message).await {
            Ok(()) => Ok(()),
            Err(ConnectionError::NotConnected) => {
                warn!("connection is down, dropping update");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirstream_connection::{RetryPolicy, WsTransport};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;
    use url::Url;

    fn closed_connection() -> ConnectionManager {
        ConnectionManager::new(
            Url::parse("ws://127.0.0.1:9").unwrap(),
            RetryPolicy::default(),
            Arc::new(WsTransport::new()),
        )
    }

    #[test]
    fn test_snapshot_message_matches_a_direct_scan() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("sub/data.txt"), "payload").unwrap();

        let notifier = ChangeNotifier::new(temp.path(), Snapshotter::new());
        let message = notifier.snapshot_message().unwrap();

        let direct = Snapshotter::new().scan(temp.path()).to_json().unwrap();
        assert_eq!(message, direct);
    }

    #[test]
    fn test_file_update_message_carries_exactly_name_size_mtime() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tracked.txt");
        std::fs::write(&file, "0123456789").unwrap();

        let notifier = ChangeNotifier::new(temp.path(), Snapshotter::new());
        let message = notifier.file_update_message(&file).unwrap();

        let value: serde_json::Value = serde_json::from_str(&message).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object["name"], "tracked.txt");
        assert_eq!(object["size"], 10);
        assert!(object.contains_key("lastModified"));
    }

    #[test]
    fn test_file_update_message_fails_for_a_missing_file() {
        let temp = TempDir::new().unwrap();
        let notifier = ChangeNotifier::new(temp.path(), Snapshotter::new());

        let result = notifier.file_update_message(&temp.path().join("gone.txt"));

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_directory_change_is_dropped_while_disconnected() {
        let temp = TempDir::new().unwrap();
        let notifier = ChangeNotifier::new(temp.path(), Snapshotter::new());
        let connection = closed_connection();

        notifier.directory_changed(&connection).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_change_is_dropped_while_disconnected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("tracked.txt");
        std::fs::write(&file, "payload").unwrap();

        let notifier = ChangeNotifier::new(temp.path(), Snapshotter::new());
        let connection = closed_connection();

        notifier.file_changed(&connection, &file).await.unwrap();
    }
}
