//! Client orchestration: one event loop over connection and watch events.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use dirstream_connection::{ConnectionEvent, ConnectionManager, WsTransport};
use dirstream_snapshot::Snapshotter;
use dirstream_watcher::{WatchEvent, WatchSetManager};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::notifier::ChangeNotifier;

/// Everything the dispatch loop reacts to, connection and filesystem alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The connection came up.
    Connected,

    /// The connection went down.
    Disconnected,

    /// An inbound text frame from the server.
    Message(String),

    /// A connection-level failure, already absorbed by the retry machinery.
    Error(String),

    /// A watched directory changed shape.
    DirectoryChanged(PathBuf),

    /// A watched file changed contents or metadata.
    FileChanged(PathBuf),
}

impl From<ConnectionEvent> for ClientEvent {
    fn from(event: ConnectionEvent) -> Self {
        match event {
            ConnectionEvent::Connected => Self::Connected,
            ConnectionEvent::Disconnected => Self::Disconnected,
            ConnectionEvent::Message(text) => Self::Message(text),
            ConnectionEvent::Error(message) => Self::Error(message),
        }
    }
}

impl From<WatchEvent> for ClientEvent {
    fn from(event: WatchEvent) -> Self {
        match event {
            WatchEvent::DirectoryChanged(path) => Self::DirectoryChanged(path),
            WatchEvent::FileChanged(path) => Self::FileChanged(path),
        }
    }
}

/// Streams one directory tree to one server.
///
/// [`run`](Self::run) connects, sends a full snapshot, registers the tree
/// with the watcher and then handles events until shutdown: structural
/// changes resend the snapshot and reconcile the watch set, file changes
/// send a single metadata update. The watcher keeps observing while the
/// connection is down, so a reconnect starts from current state.
pub struct Client {
    /// Immutable configuration.
    config: ClientConfig,

    /// Connection lifecycle and retry handling.
    connection: ConnectionManager,

    /// Watch set over the observed tree.
    watcher: WatchSetManager,

    /// Builds and sends change messages.
    notifier: ChangeNotifier,

    /// Filesystem events from the watcher.
    watch_rx: mpsc::Receiver<WatchEvent>,

    /// Stops the dispatch loop.
    cancel: CancellationToken,
}

impl Client {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let connection = ConnectionManager::new(
            config.server_url.clone(),
            config.retry_policy(),
            Arc::new(WsTransport::new()),
        );
        let (watcher, watch_rx) = WatchSetManager::new();
        let watcher = watcher.with_follow_symlinks(config.follow_symlinks);
        let snapshotter = Snapshotter::new().with_follow_symlinks(config.follow_symlinks);
        let notifier =
            ChangeNotifier::new(&config.root, snapshotter).with_payload_logging(config.debug);

        Ok(Self {
            config,
            connection,
            watcher,
            notifier,
            watch_rx,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until shutdown or until a bounded reconnect budget is spent.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "streaming {} to {}",
            self.config.root.display(),
            self.config.server_url
        );

        self.watcher.start()?;
        let mut events = self.connection.open()?;

        let result = self.dispatch(&mut events).await;

        self.connection.close().await;
        self.watcher.stop().await;

        result
    }

    async fn dispatch(&mut self, events: &mut mpsc::Receiver<ConnectionEvent>) -> Result<()> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("shutting down");
                    return Ok(());
                }
                connection = events.recv() => {
                    match connection {
                        Some(event) => self.handle_event(event.into()).await?,
                        // The channel closes when the connection task ends
                        // on its own, which only exhaustion causes.
                        None => {
                            error!("reconnect attempts exhausted, giving up");
                            return Err(ClientError::ReconnectExhausted);
                        }
                    }
                }
                watch = self.watch_rx.recv() => {
                    match watch {
                        Some(event) => self.handle_event(event.into()).await?,
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::Connected => {
                info!("sending initial snapshot of {}", self.config.root.display());
                self.notifier.directory_changed(&self.connection).await?;
                self.watcher.register_tree(&self.config.root).await?;
            }
            ClientEvent::Disconnected => {
                info!("connection lost");
            }
            ClientEvent::Message(text) => {
                info!("server message: {text}");
            }
            ClientEvent::Error(message) => {
                warn!("connection error: {message}");
            }
            ClientEvent::DirectoryChanged(path) => {
                debug!("directory changed: {}", path.display());
                self.notifier.directory_changed(&self.connection).await?;
                self.watcher.register_tree(&self.config.root).await?;
            }
            ClientEvent::FileChanged(path) => {
                debug!("file changed: {}", path.display());
                self.notifier.file_changed(&self.connection, &path).await?;
            }
        }

        Ok(())
    }
}
