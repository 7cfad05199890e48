//! WebSocket accept loop.
//!
//! Binds a TCP listener and spawns one independent session task per
//! connection. Sessions share nothing except the read-only recognizer
//! engine handle.

use crate::config::Config;
use crate::error::{EchoError, Result};
use crate::session::orchestrator::run_session;
use crate::stt::recognizer::RecognizerEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

/// The transcription server.
pub struct Server {
    config: Config,
    engine: Option<Arc<dyn RecognizerEngine>>,
}

impl Server {
    /// Creates a server. `engine` is `None` when the recognition model
    /// failed to load; connections are still accepted and each client is
    /// told the model is unavailable.
    pub fn new(config: Config, engine: Option<Arc<dyn RecognizerEngine>>) -> Self {
        Self { config, engine }
    }

    /// Accept connections forever.
    pub async fn run(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(address = %addr, "listening for clients");

        loop {
            let (stream, peer) = listener.accept().await?;
            let engine = self.engine.clone();
            let config = self.config.clone();
            tokio::spawn(async move {
                match handle_connection(stream, peer, engine, config).await {
                    Ok(()) => info!(%peer, "session finished"),
                    Err(e) if e.is_disconnect() => info!(%peer, "client disconnected"),
                    Err(e) => warn!(%peer, error = %e, "session ended with error"),
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    engine: Option<Arc<dyn RecognizerEngine>>,
    config: Config,
) -> Result<()> {
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(EchoError::WebSocket)?;
    info!(%peer, "client connected");
    run_session(ws, engine, &config).await
}
