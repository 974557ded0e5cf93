//! # Peer Allow-List
//!
//! Peer admission control consulted when the node starts without
//! synchronization. The admitted set is loaded once from configuration at
//! `init`; an empty set means the network is open and every peer is
//! admitted.

use parking_lot::RwLock;
use shared_types::PeerEndpoint;
use std::collections::HashSet;
use tracing::info;

/// Admission allow-list over configured peer endpoints.
pub struct PeerAllowList {
    configured: Vec<PeerEndpoint>,
    admitted: RwLock<HashSet<PeerEndpoint>>,
}

impl PeerAllowList {
    /// Create the service with the configured seed set. Nothing is admitted
    /// until [`init`](Self::init) runs.
    pub fn new(configured: Vec<PeerEndpoint>) -> Self {
        Self {
            configured,
            admitted: RwLock::new(HashSet::new()),
        }
    }

    /// Load the configured admitted set.
    pub fn init(&self) {
        let mut admitted = self.admitted.write();
        admitted.extend(self.configured.iter().copied());
        info!(
            admitted = admitted.len(),
            "[AllowList] Initialized peer admission list"
        );
    }

    /// Admit a single peer at runtime.
    pub fn admit(&self, peer: PeerEndpoint) {
        self.admitted.write().insert(peer);
    }

    /// Whether `peer` may connect. An empty list admits everyone.
    pub fn is_admitted(&self, peer: &PeerEndpoint) -> bool {
        let admitted = self.admitted.read();
        admitted.is_empty() || admitted.contains(peer)
    }

    /// Number of explicitly admitted peers.
    pub fn len(&self) -> usize {
        self.admitted.read().len()
    }

    /// True when no peer is explicitly admitted (open network).
    pub fn is_empty(&self) -> bool {
        self.admitted.read().is_empty()
    }
}
