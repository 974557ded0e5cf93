//! # Peer Table
//!
//! The peer set shared by the protocol modules. Gossip fan-out answers are
//! computed from this table; the peer manager feeds it as peers announce
//! themselves.

use parking_lot::RwLock;
use shared_types::PeerEndpoint;

/// Shared table of currently known peers.
#[derive(Default)]
pub struct PeerTable {
    peers: RwLock<Vec<PeerEndpoint>>,
}

impl PeerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with an initial peer set.
    pub fn with_peers(peers: Vec<PeerEndpoint>) -> Self {
        Self {
            peers: RwLock::new(peers),
        }
    }

    /// Record a peer, ignoring duplicates.
    pub fn insert(&self, peer: PeerEndpoint) {
        let mut peers = self.peers.write();
        if !peers.contains(&peer) {
            peers.push(peer);
        }
    }

    /// All known peers, in insertion order.
    pub fn snapshot(&self) -> Vec<PeerEndpoint> {
        self.peers.read().clone()
    }

    /// All known peers except `exclude` — the usual gossip fan-out shape,
    /// which never echoes a message back to its sender.
    pub fn fanout_excluding(&self, exclude: &PeerEndpoint) -> Vec<PeerEndpoint> {
        self.peers
            .read()
            .iter()
            .filter(|p| *p != exclude)
            .copied()
            .collect()
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// True when no peers are known.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}
