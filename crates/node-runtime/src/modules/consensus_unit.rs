//! # Consensus-Unit Module
//!
//! Handles consensus round traffic (tag 3). Consensus messages are
//! point-to-point between round participants, so this module never gossips:
//! its broadcast list is always empty.

use async_trait::async_trait;
use shared_types::{Broadcastable, Executable, ModuleKind, PeerEndpoint, ProtocolModule};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Consensus-unit instruction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConsensusInstruction {
    /// Leader announcing a proposal.
    Announce = 0x00,
    /// Participant commitment.
    Commit = 0x01,
    /// Participant response share.
    Response = 0x02,
}

impl ConsensusInstruction {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Announce),
            0x01 => Some(Self::Commit),
            0x02 => Some(Self::Response),
            _ => None,
        }
    }
}

/// Consensus round traffic at the dispatch boundary.
#[derive(Default)]
pub struct ConsensusUnitModule {
    processed: AtomicU64,
}

impl ConsensusUnitModule {
    /// Create the module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages handled so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Executable for ConsensusUnitModule {
    async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool {
        let Some(&instruction_tag) = message.get(offset) else {
            warn!(from = %from, "[ConsensusUnit] Missing instruction tag");
            return false;
        };
        let Some(instruction) = ConsensusInstruction::from_tag(instruction_tag) else {
            warn!(
                from = %from,
                "[ConsensusUnit] Unknown instruction {instruction_tag:#04x}"
            );
            return false;
        };

        debug!(?instruction, from = %from, "[ConsensusUnit] Handling message");
        self.processed.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl Broadcastable for ConsensusUnitModule {
    fn get_broadcast_list(&self, _instruction_tag: u8, _from: &PeerEndpoint) -> Vec<PeerEndpoint> {
        // Point-to-point protocol: nothing to re-broadcast.
        Vec::new()
    }
}

impl ProtocolModule for ConsensusUnitModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::ConsensusUnit
    }
}
