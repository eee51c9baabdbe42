//! # Watch Set Management
//!
//! This crate maintains the set of filesystem paths the dirstream client
//! observes and turns raw OS notifications into classified change events.
//! Whole trees are registered in one traversal; each registration pass also
//! reconciles the set against the live tree so watches on vanished paths
//! are pruned.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Watch Set Management                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  register_tree ──► WatchSet ──► classify ──► WatchEvent         │
//! │       │               │            ▲                            │
//! │       ▼               ▼            │                            │
//! │    walkdir     per-path watches  notify                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod event;
pub mod manager;
pub mod watch_set;

pub use error::{Result, WatchError};
pub use event::{WatchEvent, classify};
pub use manager::{RegisterOutcome, WatchSetManager, WatchStats};
pub use watch_set::WatchSet;
