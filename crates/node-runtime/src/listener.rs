//! # Lookup Listening Service
//!
//! Lookup nodes additionally expose a listening socket for query clients.
//! Failure to bind is a soft failure: the node logs a warning and keeps
//! running degraded, because serving queries is secondary to staying live
//! on the P2P network.
//!
//! Only the accept boundary lives here; the query protocol itself is served
//! elsewhere.

use std::io;
use std::net::Ipv4Addr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A bound lookup-node listener with its background accept loop.
pub struct ApiListener {
    local_port: u16,
    accept_task: JoinHandle<()>,
}

impl ApiListener {
    /// Bind the listening socket and spawn the accept loop.
    pub async fn start(port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        let local_port = listener.local_addr()?.port();

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((_stream, remote)) => {
                        // Connection handling is owned by the query service;
                        // the runtime only proves the socket is live.
                        debug!(%remote, "[ApiListener] Accepted connection");
                    }
                    Err(e) => {
                        debug!("[ApiListener] Accept failed: {e}");
                    }
                }
            }
        });

        info!(port = local_port, "[ApiListener] Listening");
        Ok(Self {
            local_port,
            accept_task,
        })
    }

    /// The port actually bound (useful when configured with port 0).
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Stop accepting connections.
    pub fn stop(&self) {
        self.accept_task.abort();
    }
}

impl Drop for ApiListener {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
