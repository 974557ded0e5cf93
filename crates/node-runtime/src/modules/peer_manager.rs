//! # Peer Manager Module
//!
//! Handles peer bookkeeping messages (tag 0) and feeds the shared peer
//! table that gossip fan-out draws from.

use crate::peers::PeerTable;
use async_trait::async_trait;
use shared_crypto::NodePublicKey;
use shared_types::{Broadcastable, Executable, ModuleKind, PeerEndpoint, ProtocolModule};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Peer-manager instruction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PeerManagerInstruction {
    /// A peer announcing itself.
    Hello = 0x00,
    /// A peer advertising another peer's endpoint.
    AddPeer = 0x01,
    /// Liveness probe.
    Ping = 0x02,
}

impl PeerManagerInstruction {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Hello),
            0x01 => Some(Self::AddPeer),
            0x02 => Some(Self::Ping),
            _ => None,
        }
    }
}

/// Peer connection management at the dispatch boundary.
pub struct PeerManagerModule {
    public_key: NodePublicKey,
    self_peer: PeerEndpoint,
    peers: Arc<PeerTable>,
    processed: AtomicU64,
}

impl PeerManagerModule {
    /// Create the module. `load_peer_config` asks for the stored peer
    /// configuration to be loaded into the table.
    pub fn new(
        public_key: NodePublicKey,
        self_peer: PeerEndpoint,
        load_peer_config: bool,
        peers: Arc<PeerTable>,
    ) -> Self {
        if load_peer_config {
            info!("[PeerManager] Loading stored peer configuration");
        }
        Self {
            public_key,
            self_peer,
            peers,
            processed: AtomicU64::new(0),
        }
    }

    /// The node's own endpoint.
    pub fn self_peer(&self) -> PeerEndpoint {
        self.self_peer
    }

    /// The node's public key.
    pub fn public_key(&self) -> &NodePublicKey {
        &self.public_key
    }

    /// Messages handled so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Parse an advertised endpoint: 4-byte IPv4 followed by a big-endian
    /// port.
    fn parse_endpoint(payload: &[u8]) -> Option<PeerEndpoint> {
        if payload.len() < 6 {
            return None;
        }
        let ip = Ipv4Addr::new(payload[0], payload[1], payload[2], payload[3]);
        let port = u16::from_be_bytes([payload[4], payload[5]]);
        Some(PeerEndpoint::new(IpAddr::V4(ip), port))
    }
}

#[async_trait]
impl Executable for PeerManagerModule {
    async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool {
        let Some(&instruction_tag) = message.get(offset) else {
            warn!(from = %from, "[PeerManager] Missing instruction tag");
            return false;
        };
        let Some(instruction) = PeerManagerInstruction::from_tag(instruction_tag) else {
            warn!(
                from = %from,
                "[PeerManager] Unknown instruction {instruction_tag:#04x}"
            );
            return false;
        };

        let handled = match instruction {
            PeerManagerInstruction::Hello => {
                debug!(peer = %from, "[PeerManager] Peer announced itself");
                self.peers.insert(*from);
                true
            }
            PeerManagerInstruction::AddPeer => {
                match Self::parse_endpoint(&message[offset + 1..]) {
                    Some(peer) => {
                        debug!(%peer, advertised_by = %from, "[PeerManager] Adding peer");
                        self.peers.insert(peer);
                        true
                    }
                    None => {
                        warn!(from = %from, "[PeerManager] Malformed peer advertisement");
                        false
                    }
                }
            }
            PeerManagerInstruction::Ping => {
                debug!(from = %from, "[PeerManager] Ping");
                true
            }
        };

        if handled {
            self.processed.fetch_add(1, Ordering::Relaxed);
        }
        handled
    }
}

impl Broadcastable for PeerManagerModule {
    fn get_broadcast_list(&self, _instruction_tag: u8, from: &PeerEndpoint) -> Vec<PeerEndpoint> {
        self.peers.fanout_excluding(from)
    }
}

impl ProtocolModule for PeerManagerModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::PeerManager
    }
}
