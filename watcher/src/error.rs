//! Error types for watch management.

use thiserror::Error;

/// Result type alias for watch operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while managing the watch set.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Watcher not started.
    #[error("watch set manager not started")]
    NotStarted,

    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
