//! # Directory Snapshots
//!
//! This crate captures the structure of a directory tree as a serializable
//! snapshot for the dirstream client. A snapshot describes every file
//! (name, size, modification time) and every subdirectory, recursively,
//! in a stable order.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Directory Snapshots                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Snapshotter ──► DirectoryNode ──► compact JSON                 │
//! │       │               │                                         │
//! │       ▼               ▼                                         │
//! │  cycle guard      FileEntry                                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod node;
pub mod scanner;

pub use error::{Result, SnapshotError};
pub use node::{DirectoryNode, FileEntry};
pub use scanner::Snapshotter;
