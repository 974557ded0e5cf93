//! # Transport Handle
//!
//! The narrow slice of the transport layer the composition root touches:
//! registering the node's own endpoint so outbound connections can carry
//! it. Injected explicitly — the runtime owns a reference, not a
//! process-wide singleton.

use parking_lot::RwLock;
use shared_types::PeerEndpoint;
use tracing::info;

/// Entry points of the transport layer consumed at startup.
pub trait TransportHandle: Send + Sync {
    /// Record the node's own endpoint with the transport.
    fn register_self_peer(&self, peer: PeerEndpoint);
}

/// In-process transport handle for single-binary deployments and tests.
#[derive(Default)]
pub struct InProcessTransport {
    self_peer: RwLock<Option<PeerEndpoint>>,
}

impl InProcessTransport {
    /// Create an unregistered handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// The endpoint registered at startup, if any.
    pub fn self_peer(&self) -> Option<PeerEndpoint> {
        *self.self_peer.read()
    }
}

impl TransportHandle for InProcessTransport {
    fn register_self_peer(&self, peer: PeerEndpoint) {
        info!(%peer, "[Transport] Registered self peer");
        *self.self_peer.write() = Some(peer);
    }
}
