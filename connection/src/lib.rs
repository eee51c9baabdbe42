//! # Connection Management
//!
//! Persistent WebSocket connection with automatic reconnect for the
//! dirstream client.
//!
//! ## Features
//!
//! - **Single connection task**: one spawned task owns the socket and
//!   drives connect/retry cycles
//! - **Fixed-interval retry**: bounded or unlimited attempt budget, with a
//!   constant wait between attempts
//! - **Event stream**: connects, disconnects, inbound frames and errors
//!   surface on one channel
//! - **Drop-when-disconnected sends**: outbound frames are never buffered
//!   across connections
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐     ┌────────────────────┐     ┌───────────────┐
//! │ ConnectionManager │ ──► │  connection task   │ ──► │   Transport   │
//! │  (open/send/close)│     │ (retry state,      │     │ (WebSocket or │
//! │                   │ ◄── │  frame pumping)    │ ◄── │  scripted)    │
//! └───────────────────┘     └────────────────────┘     └───────────────┘
//!        ▲                            │
//!        └── ConnectionEvent channel ─┘
//! ```

pub mod error;
pub mod manager;
pub mod state;
pub mod transport;

pub use error::{ConnectionError, Result};
pub use manager::{ConnectionEvent, ConnectionManager};
pub use state::{ConnectionState, RetryPolicy};
pub use transport::{FrameSink, FrameStream, Transport, WsTransport};
