//! # Directory-Service Module
//!
//! Handles directory-service committee messages (tag 1) and exposes the
//! directory synchronization entry point. Committee protocol internals are
//! behind this boundary.

use crate::peers::PeerTable;
use async_trait::async_trait;
use shared_types::{
    Broadcastable, DirectorySyncHandle, Executable, ModuleKind, PeerEndpoint, ProtocolModule,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Directory-service instruction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DirectoryInstruction {
    /// Designate the committee primary.
    SetPrimary = 0x00,
    /// A candidate submitting admission proof.
    ProofSubmission = 0x01,
    /// Committee block consensus traffic.
    CommitteeConsensus = 0x02,
}

impl DirectoryInstruction {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::SetPrimary),
            0x01 => Some(Self::ProofSubmission),
            0x02 => Some(Self::CommitteeConsensus),
            _ => None,
        }
    }
}

/// Directory-service committee protocol at the dispatch boundary.
pub struct DirectoryServiceModule {
    peers: Arc<PeerTable>,
    processed: AtomicU64,
    syncing: AtomicBool,
}

impl DirectoryServiceModule {
    /// Create the module over the shared peer table.
    pub fn new(peers: Arc<PeerTable>) -> Self {
        Self {
            peers,
            processed: AtomicU64::new(0),
            syncing: AtomicBool::new(false),
        }
    }

    /// Messages handled so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Whether directory synchronization has been started.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Executable for DirectoryServiceModule {
    async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool {
        let Some(&instruction_tag) = message.get(offset) else {
            warn!(from = %from, "[DirectoryService] Missing instruction tag");
            return false;
        };
        let Some(instruction) = DirectoryInstruction::from_tag(instruction_tag) else {
            warn!(
                from = %from,
                "[DirectoryService] Unknown instruction {instruction_tag:#04x}"
            );
            return false;
        };

        debug!(?instruction, from = %from, "[DirectoryService] Handling message");
        self.processed.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl Broadcastable for DirectoryServiceModule {
    fn get_broadcast_list(&self, _instruction_tag: u8, from: &PeerEndpoint) -> Vec<PeerEndpoint> {
        self.peers.fanout_excluding(from)
    }
}

impl ProtocolModule for DirectoryServiceModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::DirectoryService
    }
}

impl DirectorySyncHandle for DirectoryServiceModule {
    fn start_synchronization(&self) -> bool {
        info!("[DirectoryService] Starting synchronization");
        self.syncing.store(true, Ordering::Relaxed);
        true
    }
}
