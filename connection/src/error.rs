//! Error types for connection management.

use thiserror::Error;

/// Result type alias for connection operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Errors that can occur while managing a connection.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// A connection task is already running.
    #[error("connection already open")]
    AlreadyOpen,

    /// The connection is down; the message was dropped.
    #[error("not connected")]
    NotConnected,

    /// WebSocket protocol or handshake error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
