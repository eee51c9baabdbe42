//! Connection state and retry accounting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle states of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No transport connection exists.
    Disconnected,

    /// A connection attempt is in flight.
    Connecting,

    /// The transport connection is established.
    Connected,
}

/// Fixed-interval retry policy for the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum consecutive failed attempts before giving up. Negative
    /// means retry forever.
    pub max_attempts: i32,

    /// Fixed wait between attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    /// Create a policy with a bounded attempt budget, or -1 for unlimited.
    pub fn new(max_attempts: i32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Whether the attempt budget is unlimited.
    pub fn is_unlimited(&self) -> bool {
        self.max_attempts < 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: -1,
            interval: Duration::from_millis(2000),
        }
    }
}

/// Counts consecutive failed attempts within one connection task.
#[derive(Debug, Default)]
pub(crate) struct RetryState {
    attempts: u32,
}

impl RetryState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Account for one more attempt.
    ///
    /// Returns false when the policy's budget is already spent, in which
    /// case no attempt may be made.
    pub(crate) fn begin_attempt(&mut self, policy: &RetryPolicy) -> bool {
        if !policy.is_unlimited() && self.attempts >= policy.max_attempts as u32 {
            return false;
        }

        self.attempts += 1;
        true
    }

    /// Clear the counter after a successful connection, so every outage
    /// gets the full attempt budget.
    pub(crate) fn reset(&mut self) {
        self.attempts = 0;
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }
}
