//! Output sink seam.
//!
//! One session talks to exactly one client over a persistent bidirectional
//! text channel. Transcripts, status messages, and the music sentinel all go
//! through this trait; a failed send means the client is gone.

use crate::error::{EchoError, Result};
use async_trait::async_trait;
use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Pluggable text output to the connected client.
#[async_trait]
pub trait TranscriptSink: Send {
    /// Send one UTF-8 text message. A transport failure surfaces as
    /// `TransportDisconnected`.
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Liveness probe used by the periodic heartbeat.
    async fn check_alive(&mut self) -> bool;
}

/// WebSocket-backed sink over a server-side connection.
pub struct WsSink<S> {
    ws: WebSocketStream<S>,
}

impl<S> WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(ws: WebSocketStream<S>) -> Self {
        Self { ws }
    }

    /// Close the channel politely; errors are ignored since the session is
    /// ending either way.
    pub async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}

#[async_trait]
impl<S> TranscriptSink for WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, text: &str) -> Result<()> {
        self.ws
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|_| EchoError::TransportDisconnected)
    }

    async fn check_alive(&mut self) -> bool {
        // A ping exercises the transport without touching message ordering.
        self.ws.send(Message::Ping(Vec::new())).await.is_ok()
    }
}

/// Collects sent messages for tests.
#[derive(Debug, Default)]
pub struct CollectorSink {
    sent: Vec<String>,
    dead_after_sends: Option<usize>,
    alive: bool,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            dead_after_sends: None,
            alive: true,
        }
    }

    /// Sends fail once `count` messages have been accepted.
    pub fn with_failure_after(mut self, count: usize) -> Self {
        self.dead_after_sends = Some(count);
        self
    }

    /// The liveness probe reports a dead channel.
    pub fn with_dead_channel(mut self) -> Self {
        self.alive = false;
        self
    }

    /// Messages accepted so far, in send order.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

#[async_trait]
impl TranscriptSink for CollectorSink {
    async fn send(&mut self, text: &str) -> Result<()> {
        if let Some(limit) = self.dead_after_sends {
            if self.sent.len() >= limit {
                return Err(EchoError::TransportDisconnected);
            }
        }
        self.sent.push(text.to_string());
        Ok(())
    }

    async fn check_alive(&mut self) -> bool {
        self.alive
    }
}
