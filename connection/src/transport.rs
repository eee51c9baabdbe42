//! Transport seam between the connection manager and the wire.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use crate::error::Result;

/// One established connection, split into its two directions.
pub type Connection = (Box<dyn FrameSink>, Box<dyn FrameStream>);

/// Connects to a server and hands back a frame-level duplex channel.
///
/// The seam lets the reconnect machinery be exercised against a scripted
/// transport in tests; production code uses [`WsTransport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish one connection to `url`.
    async fn connect(&self, url: &Url) -> Result<Connection>;
}

/// Outbound half of an established connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Transmit one text frame.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the connection gracefully.
    async fn close(&mut self) -> Result<()>;
}

/// Inbound half of an established connection.
#[async_trait]
pub trait FrameStream: Send {
    /// Next inbound text frame, or `None` once the peer has closed.
    async fn next_text(&mut self) -> Option<Result<String>>;
}

type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport backed by tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WsTransport;

impl WsTransport {
    /// Create a WebSocket transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &Url) -> Result<Connection> {
        let (ws, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (sink, stream) = ws.split();

        Ok((
            Box::new(WsSink { inner: sink }),
            Box::new(WsStream { inner: stream }),
        ))
    }
}

struct WsSink {
    inner: SplitSink<WsConnection, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.inner.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }
}

struct WsStream {
    inner: SplitStream<WsConnection>,
}

#[async_trait]
impl FrameStream for WsStream {
    async fn next_text(&mut self) -> Option<Result<String>> {
        // Control frames are handled here so callers only ever see text.
        while let Some(frame) = self.inner.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(payload)) => {
                    debug!("ignoring binary frame ({} bytes)", payload.len());
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Ok(Message::Close(_)) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }

        None
    }
}
