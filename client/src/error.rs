//! Error types for the streaming client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in the streaming client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration error.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The bounded reconnect budget is spent.
    #[error("reconnect attempts exhausted")]
    ReconnectExhausted,

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(#[from] dirstream_connection::ConnectionError),

    /// Snapshot error.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] dirstream_snapshot::SnapshotError),

    /// Watch set error.
    #[error("watch error: {0}")]
    Watch(#[from] dirstream_watcher::WatchError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
