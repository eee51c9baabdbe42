//! Connection lifecycle and reconnect management.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{ConnectionError, Result};
use crate::state::{ConnectionState, RetryPolicy, RetryState};
use crate::transport::{FrameSink, FrameStream, Transport};

/// Buffered events and outbound frames per connection task.
const CHANNEL_BUFFER: usize = 1000;

/// Lifecycle events emitted by the connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The transport connection came up.
    Connected,

    /// The transport connection went down.
    Disconnected,

    /// An inbound text frame.
    Message(String),

    /// A transport failure, already absorbed by the retry machinery.
    Error(String),
}

/// Owns the transport connection and drives the reconnect state machine.
///
/// [`open`](Self::open) spawns a task that connects, pumps frames in both
/// directions and, after any failure or disconnect, waits a fixed interval
/// before trying again. The attempt counter resets on every successful
/// connection; when a bounded policy runs out of attempts the task ends
/// and the event channel closes.
pub struct ConnectionManager {
    /// Server to connect to.
    url: Url,

    /// Retry policy applied by the connection task.
    policy: RetryPolicy,

    /// Transport used to establish connections.
    transport: Arc<dyn Transport>,

    /// Current connection state, shared with the task.
    state: Arc<RwLock<ConnectionState>>,

    /// Outbound frames for the running task.
    outbound_tx: mpsc::Sender<String>,

    /// Cancels the running task.
    cancel: CancellationToken,

    /// Handle of the running task.
    task: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Create a manager. No connection is attempted until [`open`](Self::open).
    pub fn new(url: Url, policy: RetryPolicy, transport: Arc<dyn Transport>) -> Self {
        // The receiver is dropped immediately; open() installs a live
        // channel, and send() checks the state before queueing anyway.
        let (outbound_tx, _) = mpsc::channel(CHANNEL_BUFFER);

        Self {
            url,
            policy,
            transport,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            outbound_tx,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Spawn the connection task and return its event stream.
    ///
    /// Returns immediately; connecting happens on the task. The channel
    /// closes when the task ends, which happens only on
    /// [`close`](Self::close) or when a bounded retry policy is exhausted.
    /// A finished manager can be opened again with a fresh attempt budget.
    pub fn open(&mut self) -> Result<mpsc::Receiver<ConnectionEvent>> {
        if self.is_running() {
            return Err(ConnectionError::AlreadyOpen);
        }

        let (event_tx, event_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_BUFFER);
        self.outbound_tx = outbound_tx;
        self.cancel = CancellationToken::new();

        let task = ConnectionTask {
            url: self.url.clone(),
            policy: self.policy,
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
            cancel: self.cancel.clone(),
            event_tx,
            outbound_rx,
        };
        self.task = Some(tokio::spawn(task.run()));

        Ok(event_rx)
    }

    /// Cancel the connection task and wait for it to finish. Idempotent.
    pub async fn close(&mut self) {
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!("connection task ended abnormally: {e}");
            }
        }
    }

    /// Queue one text frame for transmission.
    ///
    /// Fails with [`ConnectionError::NotConnected`] unless the connection
    /// is currently up; the frame is dropped, never buffered for later.
    pub async fn send(&self, message: impl Into<String>) -> Result<()> {
        if self.state().await != ConnectionState::Connected {
            return Err(ConnectionError::NotConnected);
        }

        self.outbound_tx
            .send(message.into())
            .await
            .map_err(|_| ConnectionError::NotConnected)
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Whether the connection is currently up.
    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Whether the connection task is running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

/// The spawned task driving connect/retry cycles.
struct ConnectionTask {
    url: Url,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    state: Arc<RwLock<ConnectionState>>,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<ConnectionEvent>,
    outbound_rx: mpsc::Receiver<String>,
}

impl ConnectionTask {
    async fn run(mut self) {
        let mut retry = RetryState::new();

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if !retry.begin_attempt(&self.policy) {
                error!(
                    "giving up on {} after {} failed attempts",
                    self.url,
                    retry.attempts()
                );
                break;
            }

            if self.policy.is_unlimited() {
                debug!("connection attempt {} to {}", retry.attempts(), self.url);
            } else {
                debug!(
                    "connection attempt {}/{} to {}",
                    retry.attempts(),
                    self.policy.max_attempts,
                    self.url
                );
            }

            self.set_state(ConnectionState::Connecting).await;

            match self.transport.connect(&self.url).await {
                Ok((sink, stream)) => {
                    retry.reset();

                    // Frames queued against a previous connection are stale.
                    while self.outbound_rx.try_recv().is_ok() {}

                    self.set_state(ConnectionState::Connected).await;
                    if self.event_tx.send(ConnectionEvent::Connected).await.is_err() {
                        break;
                    }
                    info!("connected to {}", self.url);

                    let cancelled = Self::drive(
                        &self.cancel,
                        &self.event_tx,
                        &mut self.outbound_rx,
                        sink,
                        stream,
                    )
                    .await;

                    self.set_state(ConnectionState::Disconnected).await;
                    let gone = self
                        .event_tx
                        .send(ConnectionEvent::Disconnected)
                        .await
                        .is_err();
                    if cancelled || gone {
                        break;
                    }
                }
                Err(e) => {
                    warn!("connection to {} failed: {e}", self.url);
                    self.set_state(ConnectionState::Disconnected).await;

                    let gone = self
                        .event_tx
                        .send(ConnectionEvent::Error(e.to_string()))
                        .await
                        .is_err()
                        || self
                            .event_tx
                            .send(ConnectionEvent::Disconnected)
                            .await
                            .is_err();
                    if gone {
                        break;
                    }
                }
            }

            // Fixed-interval wait before the next attempt.
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.policy.interval) => {}
            }
        }

        self.set_state(ConnectionState::Disconnected).await;
    }

    /// Pump frames in both directions until the connection drops or the
    /// task is cancelled. Returns true when cancelled.
    async fn drive(
        cancel: &CancellationToken,
        event_tx: &mpsc::Sender<ConnectionEvent>,
        outbound_rx: &mut mpsc::Receiver<String>,
        mut sink: Box<dyn FrameSink>,
        mut stream: Box<dyn FrameStream>,
    ) -> bool {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Err(e) = sink.close().await {
                        debug!("close failed: {e}");
                    }
                    return true;
                }
                outbound = outbound_rx.recv() => {
                    // None only when the manager itself was dropped.
                    let Some(text) = outbound else { return true };
                    if let Err(e) = sink.send_text(text).await {
                        warn!("failed to send frame: {e}");
                        let _ = event_tx.send(ConnectionEvent::Error(e.to_string())).await;
                        return false;
                    }
                }
                inbound = stream.next_text() => {
                    match inbound {
                        Some(Ok(text)) => {
                            if event_tx.send(ConnectionEvent::Message(text)).await.is_err() {
                                return true;
                            }
                        }
                        Some(Err(e)) => {
                            warn!("connection error: {e}");
                            let _ = event_tx.send(ConnectionEvent::Error(e.to_string())).await;
                            return false;
                        }
                        None => {
                            info!("server closed the connection");
                            return false;
                        }
                    }
                }
            }
        }
    }

    async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }
}
