//! # dirstream client
//!
//! Streams a directory tree to a WebSocket server: one full snapshot on
//! every connect, then incremental updates as the tree changes.
//!
//! ## Features
//!
//! - **Full snapshots**: recursive directory scan serialized as compact JSON
//! - **Incremental updates**: file metadata frames for content changes,
//!   fresh snapshots for structural changes
//! - **Automatic reconnect**: fixed-interval retry with a bounded or
//!   unlimited attempt budget
//! - **Continuous observation**: the watch set survives disconnects, so
//!   the next connect resumes from current state
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                           Client                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │
//! │  │   WatchSet   │   │ Snapshotter  │   │  Connection  │     │
//! │  │   Manager    │   │              │   │   Manager    │     │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘     │
//! │         │ watch events     │ JSON trees       │ frames      │
//! │         ▼                  ▼                  ▼             │
//! │  ┌───────────────────────────────────────────────────┐      │
//! │  │               event dispatch loop                 │      │
//! │  │   connect     ⇒  snapshot + register tree         │      │
//! │  │   dir change  ⇒  snapshot + reconcile watches     │      │
//! │  │   file change ⇒  single metadata update           │      │
//! │  └───────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dirstream_client::{Client, ClientConfig};
//! use url::Url;
//!
//! let config = ClientConfig::new(Url::parse("ws://127.0.0.1:12345")?, "/srv/tree")?;
//! let mut client = Client::new(config)?;
//! client.run().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod notifier;

pub use client::{Client, ClientEvent};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use notifier::ChangeNotifier;

// Re-export from dependencies for convenience
pub use dirstream_connection::{ConnectionEvent, ConnectionManager, ConnectionState, RetryPolicy};
pub use dirstream_snapshot::{DirectoryNode, FileEntry, Snapshotter};
pub use dirstream_watcher::{RegisterOutcome, WatchEvent, WatchSetManager};
